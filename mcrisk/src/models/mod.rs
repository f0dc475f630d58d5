pub mod gbm;
pub mod montecarloengine;
pub mod path;
pub mod pathgenerator;
