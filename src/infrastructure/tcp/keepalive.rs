use crate::domain::config::KeepaliveConfig;

/// Enable kernel keep-alive probing on a connected socket.
///
/// The idle, interval and count knobs are only tunable on Linux and
/// Android; elsewhere keep-alive is switched on with system defaults.
#[cfg(unix)]
pub fn configure<F: std::os::fd::AsFd>(socket: &F, config: &KeepaliveConfig) -> std::io::Result<()> {
    use nix::sys::socket::{setsockopt, sockopt};

    setsockopt(socket, sockopt::KeepAlive, &true)?;

    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        setsockopt(socket, sockopt::TcpKeepIdle, &config.idle_secs)?;
        setsockopt(socket, sockopt::TcpKeepInterval, &config.interval_secs)?;
        setsockopt(socket, sockopt::TcpKeepCount, &config.retries)?;
    }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    let _ = config;

    Ok(())
}

#[cfg(not(unix))]
pub fn configure<S>(_socket: &S, _config: &KeepaliveConfig) -> std::io::Result<()> {
    tracing::debug!("TCP keep-alive tuning is not supported on this platform");
    Ok(())
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use nix::sys::socket::{getsockopt, sockopt};
    use tokio::net::{TcpListener, TcpStream};

    #[tokio::test]
    async fn test_keepalive_options_applied() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpStream::connect(addr).await.unwrap();

        configure(&stream, &KeepaliveConfig::default()).unwrap();

        assert!(getsockopt(&stream, sockopt::KeepAlive).unwrap());
        assert_eq!(getsockopt(&stream, sockopt::TcpKeepIdle).unwrap(), 1);
        assert_eq!(getsockopt(&stream, sockopt::TcpKeepInterval).unwrap(), 1);
        assert_eq!(getsockopt(&stream, sockopt::TcpKeepCount).unwrap(), 60);
    }
}
