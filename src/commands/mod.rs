pub mod infer;
pub mod validate;
