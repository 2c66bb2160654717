//! Consent dialogs and overlays
//!
//! Both listing and detail pages can be covered by cookie banners or
//! subscription modals. None of them is required to be present.

use crate::config::InterstitialConfig;
use crate::navigator::Navigator;
use std::time::Duration;

/// Dismisses consent controls and removes overlays on the current page
///
/// Returns how many interstitials were cleared.
pub async fn clear_interstitials<N: Navigator + ?Sized>(
    nav: &mut N,
    config: &InterstitialConfig,
    timeout: Duration,
) -> usize {
    let mut cleared = 0;
    for selector in &config.dismiss {
        if nav.dismiss(selector, timeout).await {
            tracing::debug!("Dismissed {}", selector);
            cleared += 1;
        }
    }
    for selector in &config.remove {
        let removed = nav.remove(selector).await;
        if removed > 0 {
            tracing::debug!("Removed {} element(s) matching {}", removed, selector);
            cleared += removed;
        }
    }
    cleared
}
