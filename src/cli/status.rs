use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    info,
    search::shape,
    session::{AuthSession, FileTokenStore},
    success, warning,
};

pub async fn status(session: AuthSession<FileTokenStore>) {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Checking session status...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let authenticated = session.check_status().await;
    pb.finish_and_clear();

    if !authenticated {
        warning!("Not authenticated. Run spoqcli auth.");
        return;
    }

    success!("Authenticated.");
    if let Some(user) = session.current_user().await {
        let name = user.display_name.unwrap_or_else(|| user.id.clone());
        info!("User: {}", name);
        if let Some(followers) = user.followers {
            info!("Followers: {}", shape::format_followers(followers.total));
        }
    }
}
