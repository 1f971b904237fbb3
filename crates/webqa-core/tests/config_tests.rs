use figment::Jail;
use std::path::PathBuf;

use webqa_core::chunker::ChunkerKind;
use webqa_core::config::{expand_path, Config, EmbeddingConfig, EmbeddingProvider, DEFAULT_SOURCE_URL};

#[test]
fn defaults_apply_without_config_files() {
    Jail::expect_with(|_jail| {
        let settings = Config::load_for_env("test").map_err(|e| e.to_string())?.settings().map_err(|e| e.to_string())?;

        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.overlap, 200);
        assert_eq!(settings.chunking.strategy, ChunkerKind::Fixed);
        assert_eq!(settings.retrieval.k, 4);
        assert_eq!(settings.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::OpenAi);
        assert_eq!(settings.generation.model, "gpt-4o-mini");
        Ok(())
    });
}

#[test]
fn env_file_layers_over_base_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [chunking]
            chunk_size = 500
            overlap = 50

            [embedding]
            provider = "hash"
            dim = 64
            "#,
        )?;
        jail.create_file("config.test.toml", "[retrieval]\nk = 2\n")?;

        let settings = Config::load_for_env("test").map_err(|e| e.to_string())?.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.overlap, 50);
        assert_eq!(settings.chunking.strategy, ChunkerKind::Fixed, "unset keys keep defaults");
        assert_eq!(settings.retrieval.k, 2);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Hash);
        assert_eq!(settings.embedding.dim, 64);
        assert_eq!(settings.embedding.model, "text-embedding-3-large");
        Ok(())
    });
}

#[test]
fn app_env_vars_override_files() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nchunk_size = 400\noverlap = 40\n")?;
        jail.set_env("APP_CHUNKING__OVERLAP", "100");
        jail.set_env("APP_CHUNKING__STRATEGY", "recursive");

        let config = Config::load_for_env("dev").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.chunking.chunk_size, 400);
        assert_eq!(settings.chunking.overlap, 100);
        assert_eq!(settings.chunking.strategy, ChunkerKind::Recursive);

        let size: usize = config.get("chunking.chunk_size").map_err(|e| e.to_string())?;
        assert_eq!(size, 400);
        Ok(())
    });
}

#[test]
fn invalid_chunking_fails_to_load() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nchunk_size = 100\noverlap = 100\n")?;
        assert!(Config::load_for_env("dev").is_err());
        Ok(())
    });
}

#[test]
fn prod_rejects_hash_embeddings() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[embedding]\nprovider = \"hash\"\n")?;
        assert!(Config::load_for_env("prod").is_err());
        assert!(Config::load_for_env("dev").is_ok());
        Ok(())
    });
}

#[test]
fn prod_rejects_fake_embedding_switch() {
    Jail::expect_with(|jail| {
        jail.set_env("APP_USE_FAKE_EMBEDDINGS", "1");
        let err = Config::load_for_env("prod").err().ok_or_else(|| "prod accepted fake embeddings".to_string())?;
        assert!(err.to_string().contains("APP_USE_FAKE_EMBEDDINGS"), "got: {err}");
        assert!(Config::load_for_env("test").is_ok());

        jail.set_env("APP_USE_FAKE_EMBEDDINGS", "0");
        assert!(Config::load_for_env("prod").is_ok());
        Ok(())
    });
}

#[test]
fn api_key_falls_back_to_openai_env() {
    Jail::expect_with(|jail| {
        jail.set_env("OPENAI_API_KEY", "sk-from-env");
        let mut embedding = EmbeddingConfig::default();
        assert_eq!(embedding.api_key().as_deref(), Some("sk-from-env"));

        embedding.api_key = Some("sk-explicit".to_string());
        assert_eq!(embedding.api_key().as_deref(), Some("sk-explicit"));
        Ok(())
    });
}

#[test]
fn model_dir_expands_env_vars() {
    Jail::expect_with(|jail| {
        jail.set_env("WEBQA_MODELS", "/opt/models");
        assert_eq!(expand_path("${WEBQA_MODELS}/bge-m3"), PathBuf::from("/opt/models/bge-m3"));

        let embedding = EmbeddingConfig { model_dir: Some("$WEBQA_MODELS/bge".to_string()), ..EmbeddingConfig::default() };
        assert_eq!(embedding.model_dir(), Some(PathBuf::from("/opt/models/bge")));
        Ok(())
    });
}
