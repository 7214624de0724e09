//! Renderer dev server options and the server capability.

use std::sync::Arc;

use async_trait::async_trait;
use kiln_config::{merge_values, BundlerConfig};
use serde_json::{json, Value};

use crate::error::Result;
use crate::layout::OutputLayout;
use crate::pipeline::logging::LogTab;

/// Everything a dev server needs to serve the renderer builds.
pub struct DevServerRequest {
    pub options: Value,
    pub configs: Vec<BundlerConfig>,
    /// Tab the `logging` plugin in each config writes to
    pub tab: Arc<dyn LogTab>,
}

#[async_trait]
pub trait ServerHandle: Send + Sync {
    async fn close(&self);
}

/// Live-reloading HTTP server over a set of renderer builds.
#[async_trait]
pub trait DevServer: Send + Sync {
    async fn start(&self, request: DevServerRequest) -> Result<Box<dyn ServerHandle>>;
}

/// Dev server options: defaults, then the user's overrides, then forced values.
pub fn dev_server_options(
    layout: &OutputLayout,
    port: u16,
    user: Option<&Value>,
    content_security_policy: &str,
) -> Value {
    let mut options = json!({
        "hot": true,
        "devMiddleware": { "writeToDisk": true },
        "historyApiFallback": true,
    });

    if let Some(user) = user {
        merge_values(&mut options, user);
    }

    merge_values(
        &mut options,
        &json!({
            "port": port,
            "setupExitSignals": true,
            "static": layout.renderer_dir(),
            "headers": { "Content-Security-Policy": content_security_policy },
        }),
    );

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::DEFAULT_CSP;

    #[test]
    fn defaults_are_applied() {
        let layout = OutputLayout::new("/app", ".webpack");
        let options = dev_server_options(&layout, 3000, None, DEFAULT_CSP);

        assert_eq!(options["hot"], json!(true));
        assert_eq!(options["devMiddleware"]["writeToDisk"], json!(true));
        assert_eq!(options["historyApiFallback"], json!(true));
        assert_eq!(options["static"], json!("/app/.webpack/renderer"));
        assert_eq!(options["headers"]["Content-Security-Policy"], json!(DEFAULT_CSP));
    }

    #[test]
    fn user_options_override_defaults_but_not_forced_values() {
        let layout = OutputLayout::new("/app", ".webpack");
        let user = json!({
            "hot": false,
            "port": 1234,
            "client": { "overlay": false },
            "headers": { "X-Frame-Options": "DENY" }
        });
        let options = dev_server_options(&layout, 4000, Some(&user), "default-src 'self'");

        assert_eq!(options["hot"], json!(false));
        assert_eq!(options["port"], json!(4000));
        assert_eq!(options["client"]["overlay"], json!(false));
        assert_eq!(options["headers"]["X-Frame-Options"], json!("DENY"));
        assert_eq!(
            options["headers"]["Content-Security-Policy"],
            json!("default-src 'self'")
        );
    }
}
