use serde::Serialize;

use crate::model::CourseId;

/// An entry of the built-in skill catalog. Its course id is its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

impl Skill {
    /// # Panics
    ///
    /// Never: catalog names are non-blank literals.
    #[must_use]
    pub fn course_id(&self) -> CourseId {
        CourseId::new(self.name).expect("catalog skill names are non-blank")
    }
}

pub const SKILL_CATALOG: &[Skill] = &[
    Skill {
        name: "HTML",
        category: "Web Development",
        description: "The standard markup language for creating web pages and web applications.",
    },
    Skill {
        name: "JavaScript",
        category: "Web Development",
        description: "The language of the web. Essential for front-end and back-end development.",
    },
    Skill {
        name: "React",
        category: "Web Development",
        description: "A popular JavaScript library for building user interfaces.",
    },
    Skill {
        name: "Node.js",
        category: "Web Development",
        description: "A JavaScript runtime for building fast and scalable server-side applications.",
    },
    Skill {
        name: "Python",
        category: "Data Science",
        description: "A versatile language widely used in data analysis, machine learning, and AI.",
    },
    Skill {
        name: "SQL",
        category: "Databases",
        description: "The standard language for managing and querying relational databases.",
    },
    Skill {
        name: "Docker",
        category: "DevOps",
        description: "A platform for developing, shipping, and running applications in containers.",
    },
    Skill {
        name: "Figma",
        category: "UI/UX Design",
        description: "A collaborative interface design tool for creating websites, apps, and more.",
    },
    Skill {
        name: "TypeScript",
        category: "Web Development",
        description: "A typed superset of JavaScript that compiles to plain JavaScript.",
    },
    Skill {
        name: "GraphQL",
        category: "APIs",
        description: "A query language for APIs and a runtime for fulfilling those queries with your existing data.",
    },
];

/// Case-insensitive substring search over skill names. A blank term matches everything.
#[must_use]
pub fn search_skills(term: &str) -> Vec<&'static Skill> {
    let needle = term.trim().to_lowercase();
    SKILL_CATALOG
        .iter()
        .filter(|skill| skill.name.to_lowercase().contains(&needle))
        .collect()
}
