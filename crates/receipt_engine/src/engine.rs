use std::sync::{mpsc, Arc};
use std::thread;

use crate::extract::{ExtractSettings, Extractor, GeminiExtractor};
use crate::{EngineEvent, EntryId, ExtractionRequest};

enum EngineCommand {
    Extract {
        entry_id: EntryId,
        request: ExtractionRequest,
    },
}

/// Command/event bridge to the extraction runtime. The core decides when an
/// extraction may start; the engine only executes what it is handed.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ExtractSettings) -> Self {
        Self::with_extractor(Arc::new(GeminiExtractor::new(settings)))
    }

    /// Construction seam for tests and alternative backends.
    pub fn with_extractor(extractor: Arc<dyn Extractor>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    pipeline_logging::pipeline_error!("failed to start engine runtime: {err}");
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let extractor = extractor.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(extractor.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn extract(&self, entry_id: EntryId, request: ExtractionRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Extract { entry_id, request });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    extractor: &dyn Extractor,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Extract { entry_id, request } => {
            let result = extractor.extract(entry_id, &request).await;
            let _ = event_tx.send(EngineEvent::ExtractionCompleted { entry_id, result });
        }
    }
}
