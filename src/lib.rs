// Library root
// -----------
// Batch creation and listing of Hide My Email aliases over the private web
// API. The binary (`main.rs`) wires configuration and credentials into the
// interactive flows in `ui`.
//
// Module responsibilities:
// - `config` / `credentials`: startup inputs, resolved once.
// - `envelope`: the JSON response envelope and its failure reasons.
// - `api`: the authenticated HTTP session and the three remote calls.
// - `orchestrator`: bounded-concurrency generate-then-reserve batches.
// - `store`: the append-only output file.
// - `listing`: filtering and table rendering of existing aliases.
// - `interrupt`: routes Ctrl-C to the running batch or ends the process.
// - `telemetry`: tracing subscriber setup.
// - `ui`: prompts, spinners and printed results.
pub mod api;
pub mod config;
pub mod credentials;
pub mod envelope;
pub mod interrupt;
pub mod listing;
pub mod orchestrator;
pub mod store;
pub mod telemetry;
pub mod ui;
