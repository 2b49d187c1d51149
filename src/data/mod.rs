mod array;
mod dense;

pub use array::ArrayData;
pub use dense::DenseBatch;
