mod assembly;
mod common;
