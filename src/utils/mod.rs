pub mod text_splitter;
pub mod token_estimator;
