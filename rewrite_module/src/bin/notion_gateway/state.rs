use rewrite_module::config::AppConfig;
use rewrite_module::notion::NotionClient;
use rewrite_module::openrouter::OpenRouterClient;

pub(super) struct GatewayState {
    pub config: AppConfig,
    pub notion: NotionClient,
    pub openrouter: OpenRouterClient,
}

impl GatewayState {
    pub fn new(config: AppConfig) -> Self {
        let notion = NotionClient::new(&config.notion_api_key);
        let openrouter =
            OpenRouterClient::new(&config.openrouter_api_key, &config.openrouter_model);
        Self {
            config,
            notion,
            openrouter,
        }
    }
}
