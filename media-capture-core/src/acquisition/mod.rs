pub mod acquirer;
pub mod matching;
