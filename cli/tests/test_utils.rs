//! Integration tests for the CLI utility helpers.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use studio_cli::utils::{self, SessionFile};
    use studio_shared::{
        auth::Session,
        showcase::{DisplayItem, ImageSource},
        Category, GalleryImage, HeroSlide, Project,
    };
    use tempfile::TempDir;

    fn project() -> Project {
        Project {
            id: "p-1".to_string(),
            title: "Serenity Residence".to_string(),
            description: String::new(),
            year: 2023,
            location: "Kyoto".to_string(),
            image: "https://img/cover.jpg".to_string(),
            gallery: vec![GalleryImage::new("https://img/1.jpg", true)],
            category_id: "c-1".to_string(),
            category: Some(Category {
                id: "c-1".to_string(),
                name: "Residential".to_string(),
                slug: "residential".to_string(),
            }),
            featured: true,
            display_order: 3,
        }
    }

    #[test]
    fn build_gallery_puts_plain_before_featured_and_drops_blanks() {
        let gallery = utils::build_gallery(
            &["https://img/a.jpg".to_string(), "  ".to_string()],
            &[" https://img/b.jpg ".to_string()],
        );
        assert_eq!(
            gallery,
            vec![
                GalleryImage::new("https://img/a.jpg", false),
                GalleryImage::new("https://img/b.jpg", true),
            ]
        );
    }

    #[test]
    fn password_flag_wins_over_environment() {
        let flag = utils::resolve_password(Some("flag".to_string()), Some("env".to_string()));
        assert_eq!(flag.expect("flag password"), "flag");

        let env = utils::resolve_password(None, Some("env".to_string()));
        assert_eq!(env.expect("env password"), "env");

        let blank_flag = utils::resolve_password(Some(String::new()), Some("env".to_string()));
        assert_eq!(blank_flag.expect("env password"), "env");

        let missing = utils::resolve_password(None, None).expect_err("no password");
        assert!(missing.to_string().contains(utils::ADMIN_PASSWORD_ENV));
    }

    #[test]
    fn session_file_round_trips_and_clears() {
        let dir = TempDir::new().expect("create temp dir");
        let sessions = SessionFile::new(dir.path().join("nested/session.json"));
        assert!(sessions.load().expect("load missing").is_none());

        let session = Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc
                .with_ymd_and_hms(2030, 1, 1, 0, 0, 0)
                .single()
                .expect("valid time"),
            user_email: Some("admin@studio.test".to_string()),
        };
        sessions.save(&session).expect("save session");
        assert_eq!(sessions.load().expect("load session"), Some(session));

        sessions.clear().expect("clear session");
        assert!(sessions.load().expect("load cleared").is_none());
        sessions.clear().expect("clearing twice is fine");
    }

    #[test]
    fn corrupt_session_file_is_an_error() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").expect("write garbage");
        assert!(SessionFile::new(&path).load().is_err());
    }

    #[test]
    fn project_row_shows_order_category_and_gallery_size() {
        let row = utils::format_project_row(&project());
        assert!(row.contains("Serenity Residence *"));
        assert!(row.contains("[Residential]"));
        assert!(row.contains("Kyoto (2023)"));
        assert!(row.ends_with("1 gallery"));
        assert!(row.trim_start().starts_with('3'));
    }

    #[test]
    fn slide_row_quotes_caption() {
        let slide = HeroSlide {
            id: "s-1".to_string(),
            image_url: "https://img/hero.jpg".to_string(),
            caption: Some("Dusk".to_string()),
            display_order: 1,
        };
        assert!(utils::format_slide_row(&slide).ends_with("https://img/hero.jpg  \"Dusk\""));
    }

    #[test]
    fn columns_are_listed_in_order() {
        let item = |url: &str| DisplayItem {
            url: url.to_string(),
            project_id: "p-1".to_string(),
            project_title: "Serenity Residence".to_string(),
            source: ImageSource::Cover,
        };
        let out = utils::format_columns(&[vec![item("a"), item("c")], vec![item("b")]]);
        assert_eq!(
            out,
            "column 0:\n  a  (Serenity Residence)\n  c  (Serenity Residence)\ncolumn 1:\n  b  (Serenity Residence)\n"
        );
    }
}
