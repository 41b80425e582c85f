//! Fixed catalog of the resume templates shipped with the builder.

use serde::Serialize;

pub const DEFAULT_TEMPLATE_ID: &str = "template01_classic";

const PREVIEW_BASE: &str =
    "https://firebasestorage.googleapis.com/v0/b/black-hole-tracking.firebasestorage.app/o/Preview%20Images%2F";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preview_image: String,
}

struct Entry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    // path and token query after `PREVIEW_BASE`
    preview: &'static str,
}

const CATALOG: &[Entry] = &[
    Entry {
        id: "template01_classic",
        name: "Classic Professional",
        description: "Clean, traditional layout. Focus on Experience and Education.",
        preview: "Classic%20Professional-Preview.png?alt=media&token=ab500666-7af0-42c3-8b79-8109b73714b7",
    },
    Entry {
        id: "template02_modern",
        name: "Modern Clean",
        description: "Slightly modern spacing, subtle bold headings.",
        preview: "Modern%20Clean-Preview.png?alt=media&token=69535999-d51a-4f9b-b2d0-8130d5e3212b",
    },
    Entry {
        id: "template03_creative",
        name: "Creative Portfolio",
        description: "Minimal graphics, highlight projects section.",
        preview: "Creative%20Portfolio-Preview.png?alt=media&token=a0429b7f-47c8-4f57-a3c4-8f5e0da02723",
    },
    Entry {
        id: "template04_minimal",
        name: "Minimal Resume",
        description: "Very simple, whitespace-heavy, one main column.",
        preview: "Minimal%20Resume-Preview.png?alt=media&token=cab35b31-9359-4470-b3d6-6c759bc0dfb7",
    },
    Entry {
        id: "template05_professional",
        name: "Professional Modern",
        description: "Modern fonts, subtle lines for sections.",
        preview: "Professional%20Modern-Preview.png?alt=media&token=a8dbf89b-9125-4efe-9d1b-5bd3c6e63d6c",
    },
    Entry {
        id: "template06_tech",
        name: "Tech Resume",
        description: "Focus on skills, certifications, and projects.",
        preview: "Tech%20Resume-Preview.png?alt=media&token=a83cb159-bd85-4f77-b63c-62824d79d24f",
    },
    Entry {
        id: "template07_portfolio",
        name: "Portfolio Style",
        description: "Highlights projects and achievements first.",
        preview: "Portfolio%20Style-Preview.png?alt=media&token=8cdf64f6-0f79-4b55-b1b0-c13165b0002e",
    },
    Entry {
        id: "template08_experienced",
        name: "Experienced Professional",
        description: "For mid-level to senior candidates.",
        preview: "Experienced%20Professional-Preview.png?alt=media&token=95c8aaef-eeea-4226-8914-324888594d56",
    },
    Entry {
        id: "template09_startup",
        name: "Startup Friendly",
        description: "Modern, slightly creative, concise format.",
        preview: "Startup%20Friendly-Preview.png?alt=media&token=b22984fe-fdd3-49ac-8583-d42c3319056b",
    },
    Entry {
        id: "template10_student",
        name: "Student Resume",
        description: "Emphasizes Education, Internships, and Skills.",
        preview: "Student%20Resume-Preview.png?alt=media&token=501d5d96-5380-42d1-8263-6952f2031233",
    },
    Entry {
        id: "template11_freelancer",
        name: "Freelancer Style",
        description: "Highlights Projects and Skills; minimal headings.",
        preview: "Freelancer%20Style-Preview.png?alt=media&token=da50be44-035b-41cc-a82f-9851a59317f9",
    },
    Entry {
        id: "template12_manager",
        name: "Manager Resume",
        description: "Focus on leadership, achievements, and Experience.",
        preview: "Manager%20Resume-Preview.png?alt=media&token=d73105d8-5160-4556-9adc-7f8e70f4d15e",
    },
    Entry {
        id: "template13_design",
        name: "Design Portfolio",
        description: "Clean showcase of work with project descriptions.",
        preview: "Design%20Portfolio-Preview.png?alt=media&token=a5c61acb-1592-4415-8767-c8977ee06b38",
    },
    Entry {
        id: "template14_engineer",
        name: "Engineer Style",
        description: "Technical focus; experience and certifications up front.",
        preview: "Engineer%20Style-Preview.png?alt=media&token=3221ce5f-54b5-4947-ac8f-a9c47d0feb07",
    },
    Entry {
        id: "template15_innovator",
        name: "Innovator Resume",
        description: "Highlights unique projects and achievements.",
        preview: "Innovator%20Resume-Preview.png?alt=media&token=875b6987-5f7e-430f-9d2d-c252fc1b5c1e",
    },
    Entry {
        id: "template16_advanced",
        name: "Portfolio Advanced",
        description: "Combines skills, projects, experience in a clean layout.",
        preview: "Portfolio%20Advanced-Preview.png?alt=media&token=9f363704-fef1-47e2-9fbf-f3d6d4e5a2ca",
    },
];

impl Entry {
    fn info(&self) -> TemplateInfo {
        TemplateInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            preview_image: format!("{PREVIEW_BASE}{}", self.preview),
        }
    }
}

pub fn all() -> Vec<TemplateInfo> {
    CATALOG.iter().map(Entry::info).collect()
}

pub fn find(id: &str) -> Option<TemplateInfo> {
    CATALOG.iter().find(|e| e.id == id).map(Entry::info)
}
