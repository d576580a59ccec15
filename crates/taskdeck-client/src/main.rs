use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use taskdeck_core::TaskId;
use taskdeck_service::{HttpService, TaskGateway};
use tracing::info;

use taskdeck_client::config::{ClientConfig, Command, CreateArgs, EditArgs, ListArgs};
use taskdeck_client::confirm::{Confirm, DeleteOutcome, FixedAnswer, TerminalConfirm};
use taskdeck_client::detail::DetailController;
use taskdeck_client::form::{FormController, SubmitOutcome};
use taskdeck_client::list::ListController;
use taskdeck_client::render;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("taskdeck=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::parse();
    info!("server: {}", config.server_url);

    let gateway: Arc<dyn TaskGateway> = Arc::new(match &config.api_key {
        Some(key) => HttpService::with_api_key(&config.server_url, key.clone()),
        None => HttpService::new(&config.server_url),
    });

    match config.command {
        Command::List(args) => list(gateway, &args).await,
        Command::Show { id } => show(gateway, id).await,
        Command::Create(args) => create(gateway, args).await,
        Command::Edit { id, changes } => edit(gateway, id, changes).await,
        Command::Toggle { id } => toggle(gateway, id).await,
        Command::Delete { id, yes } => {
            let confirm: Box<dyn Confirm> = if yes {
                Box::new(FixedAnswer(true))
            } else {
                Box::new(TerminalConfirm)
            };
            delete(gateway, id, confirm.as_ref()).await
        }
    }
}

fn emit(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .context("writing to stdout")
}

async fn list(gateway: Arc<dyn TaskGateway>, args: &ListArgs) -> Result<()> {
    let mut list = ListController::new(gateway);
    *list.filter_mut() = args.filter();
    if let Some(from) = &args.from {
        list.set_due_date_from(from.as_str());
    }
    if let Some(to) = &args.to {
        list.set_due_date_to(to.as_str());
    }
    list.load().await;
    emit(&render::list_view(&list, Local::now().naive_local()))?;
    match list.error() {
        Some(err) => bail!("{err}"),
        None => Ok(()),
    }
}

async fn show(gateway: Arc<dyn TaskGateway>, id: TaskId) -> Result<()> {
    let mut detail = DetailController::new(gateway);
    detail.load(id).await;
    emit(&render::detail_view(&detail, Local::now().naive_local()))?;
    match detail.error() {
        Some(err) => bail!("{err}"),
        None => Ok(()),
    }
}

async fn save(gateway: Arc<dyn TaskGateway>, mut form: FormController) -> Result<()> {
    match form.submit().await {
        SubmitOutcome::Saved(task) => show(gateway, task.id).await,
        SubmitOutcome::Invalid => {
            eprint!("{}", render::form_errors(&form));
            bail!("task not saved: fix the fields above")
        }
        SubmitOutcome::Failed => {
            eprint!("{}", render::form_errors(&form));
            bail!("task not saved")
        }
        SubmitOutcome::Busy => bail!("a save is already in progress"),
    }
}

async fn create(gateway: Arc<dyn TaskGateway>, args: CreateArgs) -> Result<()> {
    let mut form = FormController::create(gateway.clone());
    form.set_title(args.title);
    if let Some(description) = args.description {
        form.set_description(description);
    }
    if let Some(due) = args.due {
        form.set_due_date(due);
    }
    save(gateway, form).await
}

async fn edit(gateway: Arc<dyn TaskGateway>, id: TaskId, changes: EditArgs) -> Result<()> {
    let mut form = FormController::edit(gateway.clone(), id).await;
    if let Some(err) = form.server_error() {
        bail!("{err}");
    }
    if let Some(title) = changes.title {
        form.set_title(title);
    }
    if let Some(description) = changes.description {
        form.set_description(description);
    }
    if let Some(due) = changes.due {
        form.set_due_date(due);
    }
    if let Some(completed) = changes.completed {
        form.set_is_completed(completed);
    }
    save(gateway, form).await
}

async fn toggle(gateway: Arc<dyn TaskGateway>, id: TaskId) -> Result<()> {
    let mut detail = DetailController::new(gateway);
    detail.load(id).await;
    if let Some(err) = detail.error() {
        bail!("{err}");
    }
    detail.toggle_completion().await;
    emit(&render::detail_view(&detail, Local::now().naive_local()))?;
    match detail.error() {
        Some(err) => bail!("{err}"),
        None => Ok(()),
    }
}

async fn delete(gateway: Arc<dyn TaskGateway>, id: TaskId, confirm: &dyn Confirm) -> Result<()> {
    let mut detail = DetailController::new(gateway);
    detail.load(id).await;
    if let Some(err) = detail.error() {
        bail!("{err}");
    }
    match detail.delete(confirm).await {
        DeleteOutcome::Deleted => emit(&format!("Deleted task #{id}\n")),
        DeleteOutcome::Cancelled => emit("Cancelled\n"),
        DeleteOutcome::Failed => bail!("{}", detail.error().unwrap_or("delete failed")),
    }
}
