use super::Action;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> anyhow::Result<()> {
    match action {
        Action::Check(options) => crate::checker::start(&options).await.map(|_| ()),
    }
}
