// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive CLI.
//
// Module responsibilities:
// - `store`: the movie catalog itself (SQLite or JSON file), with title
//   normalization and duplicate rejection.
// - `api`: blocking OMDb client used to fetch metadata before an add.
// - `ui`: the dialoguer menu; translates store outcomes into messages.
// - `stats`, `validate`, `website`: pure helpers the menu calls.
// - `config`: environment and command-line settings.
pub mod api;
pub mod config;
pub mod stats;
pub mod store;
pub mod ui;
pub mod validate;
pub mod website;
