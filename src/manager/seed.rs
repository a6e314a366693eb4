//! Demo data loaded into every fresh workspace.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::{
    Category, ChatMessage, MessageId, Mission, MissionId, Organization, OrganizationId, Role,
    User, UserId,
};

pub fn organization() -> Organization {
    Organization {
        id: OrganizationId::from("org-1"),
        name: "Le Chant du Coq Solidaire".to_owned(),
        code: "COQ-2025".to_owned(),
    }
}

fn volunteer(
    id: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
    avatar: &str,
    interests: &[&str],
) -> User {
    User {
        id: UserId::from(id),
        username: username.to_owned(),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        avatar: avatar.to_owned(),
        role: Role::Volunteer,
        password: Some(password.to_owned()),
        interests: Some(interests.iter().map(|i| i.to_string()).collect()),
    }
}

pub fn users() -> Vec<User> {
    vec![
        volunteer(
            "u_valentin",
            "vs827",
            "Valentin",
            "Aviles",
            "123456",
            "https://ui-avatars.com/api/?name=Valentin+Aviles&background=0D8ABC&color=fff",
            &["Sport", "Informatique"],
        ),
        volunteer(
            "u1",
            "maried",
            "Marie",
            "Dupont",
            "password123",
            "https://picsum.photos/100/100?random=1",
            &["Jardinage", "Cuisine", "Social"],
        ),
        volunteer(
            "u2",
            "jean_lefevre",
            "Jean",
            "Lefevre",
            "password123",
            "https://picsum.photos/100/100?random=2",
            &["Bricolage", "Logistique"],
        ),
        volunteer(
            "u3",
            "sophiem",
            "Sophie",
            "Martin",
            "password123",
            "https://picsum.photos/100/100?random=3",
            &["Communication", "Accueil"],
        ),
        volunteer(
            "u4",
            "thomas_d",
            "Thomas",
            "Dubois",
            "password123",
            "https://picsum.photos/100/100?random=4",
            &["Sport", "Jeunesse"],
        ),
        User {
            id: UserId::from("admin1"),
            username: "admin".to_owned(),
            first_name: "Admin".to_owned(),
            last_name: "Orga".to_owned(),
            avatar: String::new(),
            role: Role::Organizer,
            password: Some("admin".to_owned()),
            interests: None,
        },
    ]
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}

fn millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

pub fn missions() -> Vec<Mission> {
    vec![
        Mission {
            id: MissionId::from("m1"),
            title: "Nettoyage des Berges".to_owned(),
            location: "Parc Central".to_owned(),
            date_start: at(2025, 6, 15, 9),
            date_end: at(2025, 6, 15, 12),
            description: "Une matinée pour rendre notre parc plus propre. Gants fournis !"
                .to_owned(),
            category: Category::Maintenance,
            max_participants: Some(10),
            participants: vec![UserId::from("u1"), UserId::from("u2")],
            chat_messages: vec![
                ChatMessage {
                    id: MessageId::from("c1"),
                    user_id: UserId::from("u1"),
                    user_name: "Marie".to_owned(),
                    user_avatar: "https://picsum.photos/100/100?random=1".to_owned(),
                    text: "Est-ce qu'il faut apporter des bottes ?".to_owned(),
                    time_created: millis(1_718_000_000_000),
                },
                ChatMessage {
                    id: MessageId::from("c2"),
                    user_id: UserId::from("admin1"),
                    user_name: "Orga".to_owned(),
                    user_avatar: String::new(),
                    text: "Oui Marie, c'est préférable !".to_owned(),
                    time_created: millis(1_718_000_500_000),
                },
            ],
        },
        Mission {
            id: MissionId::from("m2"),
            title: "Distribution Alimentaire".to_owned(),
            location: "Salle Polyvalente".to_owned(),
            date_start: at(2025, 6, 20, 18),
            date_end: at(2025, 6, 20, 21),
            description: "Distribution des paniers repas aux bénéficiaires.".to_owned(),
            category: Category::Social,
            max_participants: Some(5),
            participants: vec![UserId::from("u3"), UserId::from("u1"), UserId::from("u4")],
            chat_messages: Vec::new(),
        },
        Mission {
            id: MissionId::from("m3"),
            title: "Atelier Peinture".to_owned(),
            location: "Centre Culturel".to_owned(),
            date_start: at(2025, 6, 22, 14),
            date_end: at(2025, 6, 22, 17),
            description: "Animation d'un atelier pour les enfants du quartier.".to_owned(),
            category: Category::Event,
            max_participants: Some(3),
            participants: Vec::new(),
            chat_messages: Vec::new(),
        },
    ]
}
