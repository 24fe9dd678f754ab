use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, Rgb};
use taskflow_scanner::config::VisionProvider;
use taskflow_scanner::scan::TracingFeedback;
use taskflow_scanner::{
    AppError, CameraSource, Configuration, NameExtractor, OpenRouterExtractor, ScanController,
    ScanError, ScanMode, ScanStatus, SimulatedExtractor, StillImageCamera,
};
use tokio::sync::mpsc;
use tracing::Level;

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn build_extractor(configuration: &Configuration) -> Arc<dyn NameExtractor> {
    match configuration.vision.provider {
        VisionProvider::OpenRouter => Arc::new(OpenRouterExtractor::new(&configuration.vision)),
        VisionProvider::Simulated => Arc::new(SimulatedExtractor::new()),
    }
}

fn build_camera(configuration: &Configuration) -> Result<Arc<dyn CameraSource>, AppError> {
    if let Some(path) = &configuration.camera.image_path {
        return Ok(Arc::new(StillImageCamera::open(path)?));
    }
    match configuration.vision.provider {
        // The simulated extractor ignores pixels, so a blank card will do.
        VisionProvider::Simulated => Ok(Arc::new(StillImageCamera::from_image(
            DynamicImage::ImageRgb8(ImageBuffer::from_pixel(320, 200, Rgb([255, 255, 255]))),
        ))),
        VisionProvider::OpenRouter => Err(ScanError::Configuration(
            "No camera image configured. Pass an image path or set TASKFLOW__CAMERA__IMAGE_PATH."
                .to_string(),
        )
        .into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let mut configuration = Configuration::load(None)?;
    if let Some(path) = std::env::args().nth(1) {
        configuration.camera.image_path = Some(path.into());
    }
    init_logging(configuration.logging.max_level());

    let camera = build_camera(&configuration)?;
    let extractor = build_extractor(&configuration);
    let (name_tx, mut name_rx) = mpsc::unbounded_channel();

    let controller = ScanController::builder(configuration.scan.clone())
        .camera(camera)
        .extractor(extractor)
        .feedback(Arc::new(TracingFeedback))
        .on_resolved(move |name| {
            let _ = name_tx.send(name);
        })
        .build()?;
    controller.start()?;

    let manual = configuration.scan.trigger_mode() == ScanMode::Manual;
    if manual {
        tracing::info!("Manual mode: verifying once ({:?})", controller.trigger_scan());
    }

    let mut snapshots = controller.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(name) = name_rx.recv() => {
                println!("{name}");
                return Ok(());
            }
            _ = &mut ctrl_c => {
                controller.cancel();
                return Err(AppError::Cancelled);
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return Err(AppError::Cancelled);
                }
                let snapshot = snapshots.borrow_and_update().clone();
                tracing::info!(
                    "[{}%] {} - {}",
                    snapshot.progress,
                    snapshot.status,
                    snapshot.message
                );
                // Nobody is around to press "Verify" again.
                if manual {
                    if let ScanStatus::Failed(reason) = snapshot.status {
                        return Err(AppError::Unverified(reason));
                    }
                }
            }
        }
    }
}
