use crate::cache::ThumbnailCache;
use crate::catalog::Catalog;
use crate::config::KioskConfig;
use crate::controller::PlayerController;
use crate::loader::GstEngine;
use crate::store::VideoStore;

/// Application state: the catalog, the shared video state and the panel.
pub struct App {
    pub config: KioskConfig,
    pub catalog: Catalog,
    pub store: VideoStore,
    pub controller: PlayerController,
    pub engine: GstEngine,
    pub thumbnails: ThumbnailCache,
}

impl App {
    /// Build the initial state. The idle clip is requested right away; the
    /// engine parks it until GStreamer has been acquired.
    pub fn new(config: KioskConfig) -> Self {
        let catalog = config.load_catalog();
        let mut store = VideoStore::new(config.idle_clip.clone());
        let mut controller = PlayerController::new();
        let mut engine = GstEngine::new();
        controller.sync(&mut store, &mut engine);

        App {
            config,
            catalog,
            store,
            controller,
            engine,
            thumbnails: ThumbnailCache::new(),
        }
    }
}
