use crate::prelude::*;

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<String> {
    info!(
        "loading file {}",
        path.as_ref().to_str().unwrap_or("[non UTF-8 path]")
    );
    std::fs::read_to_string(path).map_err(Error::IOError)
}

pub fn save_json<P: AsRef<Path>, T: serde::Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        create_dir_all(dir).map_err(Error::IOError)?;
    }
    info!(
        "saving {}",
        path.to_str().unwrap_or("[non UTF-8 path]")
    );
    let text = serde_json::to_string_pretty(value).map_err(Error::JSONError)?;
    std::fs::write(path, text).map_err(Error::IOError)
}
