//! `sum`: adds any number of integer values

use crate::{
    core::{
        context::{CommandContext, ContextShape},
        descriptor::OptionDescriptor,
        lifecycle::{Command, Invocation},
    },
    samples::Output,
};
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SumContext {
    pub values: Vec<i64>,
}

impl CommandContext for SumContext {
    fn shape() -> ContextShape<Self> {
        ContextShape::new().option(
            OptionDescriptor::new("values")
                .tag("v")
                .multi_value()
                .help("Integer values to add; repeat or separate with ','"),
            |c: &mut Self, v| {
                c.values = v.list()?;
                Ok(())
            },
        )
    }
}

/// Result of adding the values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub total: i64,
    pub expression: String,
}

impl Summary {
    /// Fails when the total does not fit in an `i64`
    pub fn of(values: &[i64]) -> anyhow::Result<Self> {
        let total = values
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| anyhow::anyhow!("sum overflows i64"))?;

        Ok(Self {
            count: values.len(),
            total,
            expression: values
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join("+"),
        })
    }

    /// Lines printed by the command
    pub fn lines(&self) -> Vec<String> {
        let result = if self.count == 0 {
            format!("total = {}", self.total)
        } else {
            format!("{} = {}", self.expression, self.total)
        };
        vec![format!("{} values specified", self.count), result]
    }
}

pub struct SumCommand {
    output: Output,
}

impl SumCommand {
    pub const fn new(output: Output) -> Self {
        Self { output }
    }
}

impl Command for SumCommand {
    type Context = SumContext;

    fn execute(&mut self, context: &SumContext, _invocation: &Invocation<'_>) -> anyhow::Result<()> {
        let summary = Summary::of(&context.values)?;
        debug!("Summed {} value(s) to {}", summary.count, summary.total);

        for line in summary.lines() {
            self.output.line(line);
        }
        Ok(())
    }
}
