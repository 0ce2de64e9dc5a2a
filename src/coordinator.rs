use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::app::Navigator;
use crate::capture::FrameSource;
use crate::common::Label;
use crate::config::Configuration;
use crate::error::{AppError, SessionError};
use crate::pose::PoseClassifier;
use crate::render::Renderer;
use crate::session::{Capture, FrameOutcome, Phase, SessionController, SessionResult};
use crate::store::ResultStore;

#[derive(Debug, Clone, Copy)]
struct Timing {
    frame_interval: Duration,
    tick_interval: Duration,
    confirmation_display: Duration,
    confirmation_teardown: Duration,
}

impl From<&Configuration> for Timing {
    fn from(configuration: &Configuration) -> Self {
        Self {
            frame_interval: configuration.frame_interval(),
            tick_interval: configuration.tick_interval(),
            confirmation_display: configuration.confirmation_display(),
            confirmation_teardown: configuration.confirmation_teardown(),
        }
    }
}

/// Runs a started session: the frame loop and the countdown as two tasks,
/// both stopped when the session ends.
pub struct SessionCoordinator {
    controller: Arc<Mutex<SessionController>>,
    frame_task: Option<JoinHandle<()>>,
    countdown_task: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl SessionCoordinator {
    fn start(
        controller: SessionController,
        classifier: Arc<dyn PoseClassifier>,
        frame_source: Box<dyn FrameSource>,
        renderer: Arc<dyn Renderer>,
        timing: Timing,
    ) -> Self {
        let cancel_token = controller.cancellation();
        let controller = Arc::new(Mutex::new(controller));

        let frame_task = tokio::spawn(run_frame_loop(
            controller.clone(),
            classifier,
            frame_source,
            renderer,
            timing,
            cancel_token.clone(),
        ));
        let countdown_task = tokio::spawn(run_countdown(
            controller.clone(),
            timing.tick_interval,
            cancel_token.clone(),
        ));

        Self {
            controller,
            frame_task: Some(frame_task),
            countdown_task: Some(countdown_task),
            cancel_token,
        }
    }

    pub fn controller(&self) -> Arc<Mutex<SessionController>> {
        self.controller.clone()
    }

    pub async fn select_label(&self, label: Label) -> Result<(), SessionError> {
        self.controller.lock().await.select_label(label)
    }

    pub async fn phase(&self) -> Phase {
        self.controller.lock().await.phase()
    }

    /// Waits for the session to end and both tasks to stop.
    pub async fn join(&mut self) -> Option<SessionResult> {
        self.cancel_token.cancelled().await;
        for task in [self.frame_task.take(), self.countdown_task.take()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = task.await {
                error!("Session task failed: {}", e);
            }
        }
        self.controller.lock().await.result().cloned()
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(task) = self.frame_task.take() {
            task.abort();
        }
        if let Some(task) = self.countdown_task.take() {
            task.abort();
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_frame_loop(
    controller: Arc<Mutex<SessionController>>,
    classifier: Arc<dyn PoseClassifier>,
    mut frame_source: Box<dyn FrameSource>,
    renderer: Arc<dyn Renderer>,
    timing: Timing,
    cancel_token: CancellationToken,
) {
    let mut interval = time::interval(timing.frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = interval.tick() => {}
        }

        let phase = controller.lock().await.phase();
        if phase == Phase::Ended {
            break;
        }

        let frame = match frame_source.latest() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Frame source error: {}", e);
                continue;
            }
        };

        // Paused: keep the picture moving but do not evaluate.
        if phase != Phase::Active {
            renderer.draw_frame(&frame, None);
            continue;
        }

        // The lock is released while classifying so the countdown keeps running.
        let estimate = match classifier.classify(&frame).await {
            Ok(estimate) => estimate,
            Err(e) => {
                error!("Classification failed: {}", e);
                continue;
            }
        };

        let outcome = controller.lock().await.on_frame(&frame, &estimate);
        match outcome {
            Ok(FrameOutcome::Matched(capture)) => {
                tokio::spawn(run_confirmation(
                    controller.clone(),
                    renderer.clone(),
                    capture,
                    timing,
                    cancel_token.clone(),
                ));
            }
            Ok(outcome) => debug!("Frame {} -> {:?}", frame.id(), outcome),
            Err(e) => error!("Failed to evaluate frame {}: {}", frame.id(), e),
        }
    }

    debug!("Frame loop stopped");
}

async fn run_countdown(
    controller: Arc<Mutex<SessionController>>,
    tick_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut interval = time::interval_at(time::Instant::now() + tick_interval, tick_interval);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = interval.tick() => {
                let mut controller = controller.lock().await;
                controller.tick();
                if controller.phase() == Phase::Ended {
                    break;
                }
            }
        }
    }

    debug!("Countdown stopped");
}

/// Shows the captured snapshot, holds it, tears it down, then resumes the session.
async fn run_confirmation(
    controller: Arc<Mutex<SessionController>>,
    renderer: Arc<dyn Renderer>,
    capture: Capture,
    timing: Timing,
    cancel_token: CancellationToken,
) {
    renderer.show_capture(&capture.image);

    for hold in [timing.confirmation_display, timing.confirmation_teardown] {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Session ended during confirmation of {}", capture.label);
                return;
            }
            _ = time::sleep(hold) => {}
        }
    }

    renderer.hide_capture();
    if controller.lock().await.finish_confirmation().is_some() {
        info!("Session completed after confirming {}", capture.label);
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    classifier: Option<Arc<dyn PoseClassifier>>,
    frame_source: Option<Box<dyn FrameSource>>,
    renderer: Option<Arc<dyn Renderer>>,
    store: Option<Arc<dyn ResultStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            classifier: None,
            frame_source: None,
            renderer: None,
            store: None,
            navigator: None,
        }
    }

    pub fn classifier(mut self, classifier: Arc<dyn PoseClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    // The frame source must already be started.
    pub fn frame_source(mut self, frame_source: Box<dyn FrameSource>) -> Self {
        self.frame_source = Some(frame_source);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Starts a session over the classifier's labels. Must be called inside a tokio runtime.
    pub fn build(self) -> Result<SessionCoordinator, AppError> {
        self.configuration
            .validate()
            .map_err(AppError::InvalidConfiguration)?;

        let classifier = self
            .classifier
            .ok_or(AppError::InvalidConfiguration("Classifier not set".to_string()))?;
        let frame_source = self
            .frame_source
            .ok_or(AppError::InvalidConfiguration("Frame source not set".to_string()))?;
        let renderer = self
            .renderer
            .ok_or(AppError::InvalidConfiguration("Renderer not set".to_string()))?;
        let store = self
            .store
            .ok_or(AppError::InvalidConfiguration("Result store not set".to_string()))?;
        let navigator = self
            .navigator
            .ok_or(AppError::InvalidConfiguration("Navigator not set".to_string()))?;

        let mut controller = SessionController::new(
            self.configuration.rules(),
            store,
            navigator,
            renderer.clone(),
        );
        controller.start(classifier.labels())?;

        Ok(SessionCoordinator::start(
            controller,
            classifier,
            frame_source,
            renderer,
            Timing::from(&self.configuration),
        ))
    }
}
