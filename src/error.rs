// Error type for the engine, the demo window and the camera.
// Every variant states *where* things went wrong.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed
    #[error("Config read error: {0}")]
    ConfigRead(#[from] std::io::Error), // bodypaint.toml could not be read
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error), // bodypaint.toml is not valid
}

pub type Result<T> = std::result::Result<T, Error>;
