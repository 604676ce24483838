use super::*;

const ONE_PX_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAAAXNSR0IArs4c6QAAAAtJREFUGFdjYAACAAAFAAGq1chRAAAAAElFTkSuQmCC";

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "imprint_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn base64_data_url_decodes() {
    let loader = AssetLoader::new(".");
    let bytes = loader
        .load(&format!("data:image/png;base64,{ONE_PX_PNG}"))
        .await
        .unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[tokio::test]
async fn non_base64_data_url_is_rejected() {
    let loader = AssetLoader::new(".");
    let err = loader
        .load("data:text/plain,Hello%2C%20World!")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("only base64"));
}

#[tokio::test]
async fn absolute_relative_and_file_url_paths() {
    let dir = temp_dir("loader_paths");
    let file = dir.join("test.txt");
    std::fs::write(&file, "Hello, World!").unwrap();

    let loader = AssetLoader::new(&dir);
    assert_eq!(
        loader.load(file.to_str().unwrap()).await.unwrap(),
        b"Hello, World!"
    );
    assert_eq!(loader.load("./test.txt").await.unwrap(), b"Hello, World!");
    let url = format!("file://{}", file.display());
    assert_eq!(loader.load(&url).await.unwrap(), b"Hello, World!");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn missing_files_fail_descriptively() {
    let dir = temp_dir("loader_missing");
    let loader = AssetLoader::new(&dir);

    let err = loader.load("./nope.txt").await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));

    let abs = dir.join("nope.txt");
    let err = loader.load(abs.to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, ImprintError::Load { .. }));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn unknown_schemes_are_unsupported() {
    let loader = AssetLoader::new(".");
    let err = loader.load("not-implemented://test.txt").await.unwrap_err();
    assert!(err.to_string().contains("unsupported asset source"));
}

#[cfg(unix)]
#[tokio::test]
async fn io_errors_are_not_reported_as_missing() {
    let dir = temp_dir("notdir");
    std::fs::write(dir.join("plain.txt"), b"x").unwrap();
    let loader = AssetLoader::new(&dir);

    let err = loader.load("./plain.txt/child.png").await.unwrap_err();
    assert!(matches!(err, ImprintError::Other(_)), "{err}");
    assert!(!err.to_string().contains("does not exist"), "{err}");

    std::fs::remove_dir_all(&dir).ok();
}
