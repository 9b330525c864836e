use std::sync::Arc;

use crate::clients::ProductClient;
use crate::clock::Clock;
use crate::controller::DownloadController;
use crate::locator::UrlSigner;
use crate::purchases::PurchaseService;

#[derive(Clone)]
pub struct AppState {
    pub controller: DownloadController,
    pub purchases: PurchaseService,
    pub products: ProductClient,
    pub url_signer: UrlSigner,
    pub clock: Arc<dyn Clock>,
}
