//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    AuthService, CodeGenerator, CodeStrategy, LinkService, ResolutionEngine,
};
use crate::config::Config;
use crate::domain::click_recorder::ClickRecorder;
use crate::domain::repositories::{ClickRepository, LinkRepository, TokenRepository};
use crate::utils::extract_domain::DomainScope;

pub type DynLinkService = LinkService<dyn LinkRepository, dyn ClickRepository>;
pub type DynResolutionEngine = ResolutionEngine<dyn LinkRepository>;
pub type DynAuthService = AuthService<dyn TokenRepository>;

/// Settings the services are built from.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub default_domain: String,
    pub code_strategy: CodeStrategy,
    pub short_code_length: usize,
    pub code_max_attempts: u32,
    pub token_signing_secret: String,
    pub behind_proxy: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            default_domain: "localhost".to_string(),
            code_strategy: CodeStrategy::Random,
            short_code_length: 6,
            code_max_attempts: 10,
            token_signing_secret: String::new(),
            behind_proxy: false,
        }
    }
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_domain: config.default_domain.clone(),
            code_strategy: config.code_strategy,
            short_code_length: config.short_code_length,
            code_max_attempts: config.code_max_attempts,
            token_signing_secret: config.token_signing_secret.clone(),
            behind_proxy: config.behind_proxy,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub resolver: Arc<DynResolutionEngine>,
    pub auth_service: Arc<DynAuthService>,
    pub click_recorder: ClickRecorder,
    pub link_repository: Arc<dyn LinkRepository>,
    pub domains: DomainScope,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services over the given repositories.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        click_repository: Arc<dyn ClickRepository>,
        token_repository: Arc<dyn TokenRepository>,
        click_recorder: ClickRecorder,
        settings: &ServiceSettings,
    ) -> Self {
        let domains = DomainScope::new(settings.default_domain.clone());

        let generator = CodeGenerator::new(
            link_repository.clone(),
            settings.code_strategy,
            settings.short_code_length,
            settings.code_max_attempts,
        );

        let link_service = Arc::new(LinkService::new(
            link_repository.clone(),
            click_repository,
            generator,
            domains.clone(),
        ));
        let resolver = Arc::new(ResolutionEngine::new(link_repository.clone()));
        let auth_service = Arc::new(AuthService::new(
            token_repository,
            settings.token_signing_secret.clone(),
        ));

        Self {
            link_service,
            resolver,
            auth_service,
            click_recorder,
            link_repository,
            domains,
            behind_proxy: settings.behind_proxy,
        }
    }
}
