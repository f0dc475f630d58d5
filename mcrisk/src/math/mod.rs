pub mod randomnumbers;
pub mod statistics;
