pub mod constants;
pub mod photometry;
pub mod planck;
