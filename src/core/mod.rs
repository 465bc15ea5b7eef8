//! Core binding pipeline
//!
//! Tokenizing, option resolution, context building, error aggregation,
//! command dispatch and the execution lifecycle.

pub mod commander;
pub mod context;
pub mod descriptor;
pub mod lifecycle;
pub mod resolver;
pub mod tokenizer;
pub mod validation;

pub use commander::{CommandFactory, CommandResolver, Commander};
pub use context::{BuiltContext, CommandContext, ContextBuilder, ContextShape, OptionValue};
pub use descriptor::OptionDescriptor;
pub use lifecycle::{Command, Invocation, Runnable, Stage};
pub use resolver::{OptionResolver, ResolvedOption};
pub use tokenizer::{Arguments, RawOption, Tokenizer};
pub use validation::{ErrorDetail, ErrorDetailList, ErrorKind};
