pub use crate::{
    core::{config::*, request::*, wire::*},
    math::{randomnumbers::*, statistics::*},
    models::{gbm::*, montecarloengine::*, path::*, pathgenerator::*},
    risk::aggregator::*,
    time::daycounter::*,
    utils::errors::*,
};
