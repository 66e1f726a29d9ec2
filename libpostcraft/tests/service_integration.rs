//! Integration tests for PostcraftService
//!
//! Exercises the facade built from a config file: durable drafts, preview
//! links that survive a restart, and publishing through a mock client.

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use libpostcraft::composition::PostBuilder;
use libpostcraft::config::Config;
use libpostcraft::error::PlatformError;
use libpostcraft::platforms::mock::MockPublisher;
use libpostcraft::{
    AuthHandle, PostType, PostcraftError, PostcraftService, RequestContext, Visibility,
};
use tempfile::TempDir;

/// Write a config using a temp dir for drafts, previews and the signing secret
fn write_config(dir: &TempDir) -> Result<Config> {
    let secret_path = dir.path().join("preview.secret");
    fs::write(&secret_path, "integration-secret\n")?;

    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[storage]
path = "{}"
io_timeout = "2s"

[preview]
base_url = "https://preview.example.com"
default_ttl = "15m"
output_dir = "{}"
secret_file = "{}"

[defaults]
owner = "alice"
theme = "thought_leader"
"#,
            dir.path().join("drafts").display().to_string().replace('\\', "/"),
            dir.path().join("previews").display().to_string().replace('\\', "/"),
            secret_path.display().to_string().replace('\\', "/"),
        ),
    )?;

    Ok(Config::load_from_path(&config_path)?)
}

#[tokio::test]
async fn test_service_from_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    let service = PostcraftService::from_config(write_config(&dir)?).await?;

    assert_eq!(service.config().defaults.owner, "alice");
    assert_eq!(service.previews().default_ttl(), chrono::Duration::minutes(15));
    assert!(service.themes().contains("thought_leader"));
    assert!(service.publishing().is_none());
    Ok(())
}

#[tokio::test]
async fn test_drafts_survive_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let ctx = RequestContext::for_owner("alice")?;

    let (first_id, second_id, token) = {
        let service = PostcraftService::from_config(write_config(&dir)?).await?;
        let first = service
            .drafts()
            .create_draft(&ctx, "First", PostType::Text, None)
            .await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service
            .drafts()
            .create_draft(&ctx, "Second", PostType::Poll, Some("storyteller"))
            .await?;
        let link = service.issue_preview(&ctx, &first.draft_id, None).await?;
        (first.draft_id, second.draft_id, link.token)
    };

    assert!(dir
        .path()
        .join("drafts")
        .join("alice")
        .join(format!("{}.json", first_id))
        .exists());

    let service = PostcraftService::from_config(write_config(&dir)?).await?;
    let drafts = service.drafts().list_drafts(&ctx).await?;
    assert_eq!(drafts.len(), 2);

    let current = service.drafts().get_current_draft(&ctx).await?;
    assert_eq!(current.map(|d| d.draft_id), Some(second_id));

    let resolved = service.previews().resolve(&token).await?;
    assert_eq!(resolved.draft_id, first_id);
    Ok(())
}

#[tokio::test]
async fn test_delete_removes_file_and_preview() -> Result<()> {
    let dir = TempDir::new()?;
    let ctx = RequestContext::for_owner("alice")?;
    let service = PostcraftService::from_config(write_config(&dir)?).await?;

    let draft = service
        .drafts()
        .create_draft(&ctx, "Doomed", PostType::Text, None)
        .await?;
    let link = service.issue_preview(&ctx, &draft.draft_id, None).await?;

    service.drafts().delete_draft(&ctx, &draft.draft_id).await?;

    assert!(!dir
        .path()
        .join("drafts")
        .join("alice")
        .join(format!("{}.json", draft.draft_id))
        .exists());
    assert!(matches!(
        service.previews().resolve(&link.token).await,
        Err(PostcraftError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_export_import_between_owners() -> Result<()> {
    let dir = TempDir::new()?;
    let service = PostcraftService::from_config(write_config(&dir)?).await?;
    let alice = RequestContext::for_owner("alice")?;
    let bob = RequestContext::for_owner("bob")?;

    let draft = service
        .drafts()
        .create_draft(&alice, "Shared", PostType::Text, None)
        .await?;
    let theme = service.themes().get_theme("thought_leader")?;
    let post = PostBuilder::listicle(
        "3 habits that stuck",
        &["Write", "Ship", "Reflect"],
        "Start small.",
        Some(theme),
    );
    service.compose_into_draft(&alice, &draft.draft_id, &post).await?;

    let json = service.drafts().export_draft(&alice, &draft.draft_id).await?;
    let imported = service.drafts().import_draft(&bob, &json).await?;

    assert_eq!(imported.name, "Shared");
    assert_eq!(imported.composed_text(), Some(post.compose()?.as_str()));
    assert_eq!(service.drafts().list_drafts(&bob).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_publish_current_draft() -> Result<()> {
    let dir = TempDir::new()?;
    let mock = Arc::new(MockPublisher::requiring_token("mock", "oauth-token"));
    let service = PostcraftService::from_config(write_config(&dir)?)
        .await?
        .with_publisher(mock.clone());

    let ctx = service
        .default_context()?
        .with_auth(AuthHandle::new("oauth-token"));
    let draft = service
        .drafts()
        .create_draft(&ctx, "Ship it", PostType::Text, None)
        .await?;
    let theme = service.themes().get_theme("thought_leader")?;
    let post = PostBuilder::thought_leadership(
        "90% of teams skip retros.",
        "Retro Loop",
        &["Observe", "Discuss", "Commit"],
        "Small loops compound.",
        Some(theme),
    );
    service.compose_into_draft(&ctx, &draft.draft_id, &post).await?;

    let publishing = service.publishing().ok_or_else(|| anyhow::anyhow!("no publisher"))?;

    let dry = publishing.publish_current(&ctx, Visibility::Public, true).await?;
    assert!(dry.is_dry_run());
    assert_eq!(mock.publish_call_count(), 0);

    let outcome = publishing.publish_current(&ctx, Visibility::Public, false).await?;
    assert_eq!(outcome.draft_id, draft.draft_id);
    assert!(outcome.receipt.is_some());
    assert_eq!(mock.published()[0].0, post.compose()?);
    Ok(())
}

#[tokio::test]
async fn test_publish_with_wrong_token_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let service = PostcraftService::from_config(write_config(&dir)?)
        .await?
        .with_publisher(Arc::new(MockPublisher::requiring_token("mock", "right")));

    let ctx = service.default_context()?.with_auth(AuthHandle::new("wrong"));
    let draft = service
        .drafts()
        .create_draft(&ctx, "Nope", PostType::Text, None)
        .await?;
    let theme = service.themes().get_theme("thought_leader")?;
    let post = PostBuilder::comparison(
        "Tabs or spaces?",
        "Tabs",
        "Spaces",
        "Whatever the formatter says.",
        Some(theme),
    );
    service.compose_into_draft(&ctx, &draft.draft_id, &post).await?;

    let publishing = service.publishing().ok_or_else(|| anyhow::anyhow!("no publisher"))?;
    let result = publishing.publish_current(&ctx, Visibility::Public, false).await;
    assert!(matches!(
        result,
        Err(PostcraftError::PublishFailed(PlatformError::Authentication(_)))
    ));
    Ok(())
}
