pub mod batch;
pub mod configs;
pub mod credentials;
pub mod errors;
pub mod logging;
pub mod prompts;
pub mod status;
pub mod translators;
pub mod workbooks;
