pub mod dictionary;
pub mod terms;
pub mod triple;
