pub mod daycounter;
