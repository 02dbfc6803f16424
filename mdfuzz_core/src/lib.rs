pub mod config;
pub mod decoder;
pub mod dispatcher;
pub mod executor;
pub mod oracle;
pub mod payload;
pub mod registry;
pub mod seeds;
pub mod target;

pub use config::HarnessConfig;
pub use decoder::{ByteDecoder, DecodeLimits};
pub use dispatcher::{
    Dispatcher, HarnessFault, Outcome, SkipReason, default_dispatcher, run_iteration,
};
pub use executor::{ExecutionStatus, Executor, ReplayExecutor};
pub use oracle::{BugReport, CrashOracle, Oracle};
pub use payload::{Payload, PayloadKind};
pub use registry::{REGISTRY, TestCase};
pub use seeds::{Seed, seed_corpus};
pub use target::{Feature, MarkdownRenderer, OutputFormat, Profile, RenderError, Renderer};
