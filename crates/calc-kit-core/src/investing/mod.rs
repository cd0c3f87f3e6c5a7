pub mod correlation;
pub mod kelly;
pub mod options_probability;
