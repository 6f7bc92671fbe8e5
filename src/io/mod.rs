// Purpose - file decode/encode at the edges of the pipeline

pub mod wav;

pub use wav::{read_mono, write_mono};
