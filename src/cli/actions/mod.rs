mod run;

use crate::checker::Options;

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Check(Options),
}

impl Action {
    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails to execute
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
