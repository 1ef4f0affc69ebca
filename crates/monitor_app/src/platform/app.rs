use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use monitor_core::SessionState;
use monitor_engine::{ScrapeApi, StreamSession, StreamSettings, TaskId};
use monitor_logging::monitor_debug;

use super::render::Renderer;
use crate::{Cli, Command};

/// How long one wait for stream events may block before re-checking state.
const TICK: Duration = Duration::from_millis(75);

pub(crate) fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = StreamSettings {
        base_url: cli.api_url.clone(),
        idle_timeout: cli.idle_timeout_secs.map(Duration::from_secs),
        ..StreamSettings::default()
    };
    monitor_debug!("Using backend {}", settings.base_url);

    match cli.command {
        Command::Start(args) => {
            let api = ScrapeApi::new(settings.clone())?;
            let runtime = build_runtime()?;
            let task_id = runtime
                .block_on(api.start(&args.to_request()))
                .context("failed to start scraping")?;
            println!("Started task {task_id}");
            if args.no_watch {
                return Ok(ExitCode::SUCCESS);
            }
            watch(settings, task_id)
        }
        Command::Watch { task_id } => watch(settings, TaskId::from(task_id)),
        Command::Stop { task_id } => {
            let api = ScrapeApi::new(settings)?;
            let runtime = build_runtime()?;
            let task_id = TaskId::from(task_id);
            runtime
                .block_on(api.stop(&task_id))
                .with_context(|| format!("failed to stop task {task_id}"))?;
            println!("Stopped task {task_id}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn watch(settings: StreamSettings, task_id: TaskId) -> anyhow::Result<ExitCode> {
    let mut session = StreamSession::new(settings).context("failed to start stream engine")?;
    let mut renderer = Renderer::new(io::stdout().lock());

    let view = session.bind(Some(task_id));
    renderer.render(&view)?;
    while session.state().is_running() {
        if session.wait_for_change(TICK) {
            renderer.render(&session.view())?;
        }
    }

    let view = session.view();
    renderer.finish(&view)?;
    session.dispose();

    Ok(match view.state {
        SessionState::Completed => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")
}
