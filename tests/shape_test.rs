use spoqcli::search::shape::{
    ImageSize, PLACEHOLDER_IMAGE, ResultKind, format_duration, format_followers, image_url,
    result_limit,
};
use spoqcli::types::{Image, SearchCategory};

fn image(url: &str) -> Image {
    Image {
        url: url.to_string(),
        width: None,
        height: None,
    }
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(999), "0:00");
    assert_eq!(format_duration(1_000), "0:01");
    assert_eq!(format_duration(59_000), "0:59");
    assert_eq!(format_duration(60_000), "1:00");
    // Seconds are always zero-padded to two digits
    assert_eq!(format_duration(61_000), "1:01");
    assert_eq!(format_duration(225_000), "3:45");
    // Over an hour keeps accumulating minutes
    assert_eq!(format_duration(3_725_000), "62:05");
}

#[test]
fn test_format_followers() {
    assert_eq!(format_followers(0), "0");
    assert_eq!(format_followers(950), "950");
    assert_eq!(format_followers(999), "999");
    assert_eq!(format_followers(1_000), "1.0K");
    assert_eq!(format_followers(1_500), "1.5K");
    assert_eq!(format_followers(999_999), "1000.0K");
    assert_eq!(format_followers(1_000_000), "1.0M");
    assert_eq!(format_followers(2_300_000), "2.3M");
}

#[test]
fn test_image_url_tiers() {
    let images = vec![image("large"), image("medium"), image("small")];

    assert_eq!(image_url(&images, ImageSize::Large), "large");
    assert_eq!(image_url(&images, ImageSize::Medium), "medium");
    assert_eq!(image_url(&images, ImageSize::Small), "small");
}

#[test]
fn test_image_url_single_entry() {
    let images = vec![image("only")];

    // Every tier degrades to the one image available
    assert_eq!(image_url(&images, ImageSize::Large), "only");
    assert_eq!(image_url(&images, ImageSize::Medium), "only");
    assert_eq!(image_url(&images, ImageSize::Small), "only");
}

#[test]
fn test_image_url_placeholder() {
    assert_eq!(image_url(&[], ImageSize::Large), PLACEHOLDER_IMAGE);
    assert_eq!(image_url(&[], ImageSize::Small), PLACEHOLDER_IMAGE);
}

#[test]
fn test_result_limits() {
    assert_eq!(result_limit(SearchCategory::All, ResultKind::Tracks), 8);
    assert_eq!(result_limit(SearchCategory::All, ResultKind::Artists), 6);
    assert_eq!(result_limit(SearchCategory::All, ResultKind::Albums), 6);
    assert_eq!(result_limit(SearchCategory::All, ResultKind::Playlists), 6);

    assert_eq!(result_limit(SearchCategory::Track, ResultKind::Tracks), 20);
    assert_eq!(result_limit(SearchCategory::Artist, ResultKind::Artists), 20);
    assert_eq!(result_limit(SearchCategory::Album, ResultKind::Albums), 20);
    assert_eq!(
        result_limit(SearchCategory::Playlist, ResultKind::Playlists),
        20
    );
}
