use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use wardrobe_core::{Garment, Outfit, RecommendCriteria, ToneSignal, ToneTally, Undertone};
use wardrobe_store::{Closet, GarmentForm, StoreError, UploadedImage};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(std::io::Error),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Snapshot returned by the status call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineStatus {
    pub garments: i64,
    pub tally: ToneTally,
    pub undertone: Undertone,
}

type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

/// Messages sent from D-Bus handlers to the engine thread.
enum EngineRequest {
    AddGarment {
        source: PathBuf,
        form: GarmentForm,
        reply: Reply<Garment>,
    },
    UploadAndDetect {
        source: PathBuf,
        reply: Reply<UploadedImage>,
    },
    DeleteGarment {
        id: i64,
        reply: Reply<Option<Garment>>,
    },
    RecordWear {
        id: i64,
        reply: Reply<bool>,
    },
    ListGarments {
        reply: Reply<Vec<Garment>>,
    },
    Recommend {
        criteria: RecommendCriteria,
        reply: Reply<Vec<Outfit>>,
    },
    RecordAnswer {
        answer: String,
        reply: Reply<Option<ToneSignal>>,
    },
    FinalUndertone {
        reply: Reply<Undertone>,
    },
    ResetQuiz {
        reply: Reply<()>,
    },
    Status {
        reply: Reply<EngineStatus>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> EngineRequest,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }

    pub async fn add_garment(
        &self,
        source: PathBuf,
        form: GarmentForm,
    ) -> Result<Garment, EngineError> {
        self.request(|reply| EngineRequest::AddGarment {
            source,
            form,
            reply,
        })
        .await
    }

    pub async fn upload_and_detect(&self, source: PathBuf) -> Result<UploadedImage, EngineError> {
        self.request(|reply| EngineRequest::UploadAndDetect { source, reply })
            .await
    }

    pub async fn delete_garment(&self, id: i64) -> Result<Option<Garment>, EngineError> {
        self.request(|reply| EngineRequest::DeleteGarment { id, reply })
            .await
    }

    pub async fn record_wear(&self, id: i64) -> Result<bool, EngineError> {
        self.request(|reply| EngineRequest::RecordWear { id, reply })
            .await
    }

    pub async fn list_garments(&self) -> Result<Vec<Garment>, EngineError> {
        self.request(|reply| EngineRequest::ListGarments { reply })
            .await
    }

    pub async fn recommend(&self, criteria: RecommendCriteria) -> Result<Vec<Outfit>, EngineError> {
        self.request(|reply| EngineRequest::Recommend { criteria, reply })
            .await
    }

    pub async fn record_answer(&self, answer: String) -> Result<Option<ToneSignal>, EngineError> {
        self.request(|reply| EngineRequest::RecordAnswer { answer, reply })
            .await
    }

    pub async fn final_undertone(&self) -> Result<Undertone, EngineError> {
        self.request(|reply| EngineRequest::FinalUndertone { reply })
            .await
    }

    pub async fn reset_quiz(&self) -> Result<(), EngineError> {
        self.request(|reply| EngineRequest::ResetQuiz { reply })
            .await
    }

    pub async fn status(&self) -> Result<EngineStatus, EngineError> {
        self.request(|reply| EngineRequest::Status { reply }).await
    }
}

/// Spawn the engine on a dedicated OS thread that owns the closet.
///
/// The closet is opened before the thread starts, so a bad database path
/// fails at startup rather than on the first request.
pub fn spawn_engine(closet: Closet) -> Result<EngineHandle, EngineError> {
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(16);

    std::thread::Builder::new()
        .name("wardrobe-engine".into())
        .spawn(move || {
            let mut closet = closet;
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                handle_request(&mut closet, req);
            }
            tracing::info!("engine thread exiting");
        })
        .map_err(EngineError::Spawn)?;

    Ok(EngineHandle { tx })
}

fn handle_request(closet: &mut Closet, req: EngineRequest) {
    // A dropped receiver means the caller gave up; nothing to do.
    match req {
        EngineRequest::AddGarment {
            source,
            form,
            reply,
        } => {
            let _ = reply.send(closet.add_garment(&source, &form).map_err(Into::into));
        }
        EngineRequest::UploadAndDetect { source, reply } => {
            let _ = reply.send(closet.upload_and_detect(&source).map_err(Into::into));
        }
        EngineRequest::DeleteGarment { id, reply } => {
            let _ = reply.send(closet.delete_garment(id).map_err(Into::into));
        }
        EngineRequest::RecordWear { id, reply } => {
            let _ = reply.send(closet.record_wear(id).map_err(Into::into));
        }
        EngineRequest::ListGarments { reply } => {
            let _ = reply.send(closet.list_garments().map_err(Into::into));
        }
        EngineRequest::Recommend { criteria, reply } => {
            let _ = reply.send(closet.recommend(&criteria).map_err(Into::into));
        }
        EngineRequest::RecordAnswer { answer, reply } => {
            let _ = reply.send(closet.record_undertone_answer(&answer).map_err(Into::into));
        }
        EngineRequest::FinalUndertone { reply } => {
            let _ = reply.send(Ok(closet.final_undertone()));
        }
        EngineRequest::ResetQuiz { reply } => {
            let _ = reply.send(closet.reset_quiz().map_err(Into::into));
        }
        EngineRequest::Status { reply } => {
            let status = closet
                .store()
                .garment_count()
                .map(|garments| EngineStatus {
                    garments,
                    tally: closet.tally(),
                    undertone: closet.final_undertone(),
                })
                .map_err(Into::into);
            let _ = reply.send(status);
        }
    }
}
