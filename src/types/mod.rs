pub mod records;
pub mod variable;
