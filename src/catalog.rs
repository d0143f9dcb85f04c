//! Question/answer clip catalog.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

/// One question with its recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: u32,
    pub question: String,
    pub answer: String,
    pub video_url: String,
}

/// Ordered, read-only list of clips.
#[derive(Debug, Clone)]
pub struct Catalog {
    clips: Vec<Clip>,
}

const BUILTIN: &[(u32, &str, &str, &str)] = &[
    (
        1,
        "What academic programs and degrees does the institution offer?",
        "SWAU offers a variety of undergraduate and graduate programs across multiple disciplines, including liberal arts, sciences, education, and psychology. For a comprehensive list of programs and degrees, please refer to the university's academic catalog.",
        "https://res.cloudinary.com/djfiaa34u/video/upload/v1740097355/1_mtklma.mp4",
    ),
    (
        2,
        "What are the admission requirements?",
        "Admission requirements vary depending on the applicant's background: Freshman Applicants: Typically need to submit high school transcripts and standardized test scores. Transfer Applicants: A minimum GPA of 2.0 is required. Applicants with fewer than 24 credits should also provide high school transcripts. RN to BS Nursing Applicants: Must have completed an associate degree or diploma program from an accredited institution and hold an active, unencumbered RN license. Provisional Applicants: Individuals over 25 who do not meet regular admission criteria may be considered on an individual basis. Placement scores in English and math are also required for both freshman and transfer students.",
        "https://res.cloudinary.com/djfiaa34u/video/upload/v1740097347/2_chsmma.mp4",
    ),
    (
        3,
        "Is there a financing plan available?",
        "Yes, SWAU offers various financial aid options, including federal and state grants, loans, and scholarships. The Department of Student Financial Services can provide detailed information and assistance.",
        "https://res.cloudinary.com/djfiaa34u/video/upload/v1740097311/3_uh1f2b.mp4",
    ),
    (
        4,
        "What are the important dates for the admission and registration process?",
        "For international students, application deadlines are May 1 for the fall semester and October 1 for the spring semester. Students must be fully admitted by June 1 for the fall semester and November 1 for the spring semester to allow sufficient time for obtaining an I-20 and student visa.",
        "https://res.cloudinary.com/djfiaa34u/video/upload/v1740097361/4_wipfvf.mp4",
    ),
    (
        5,
        "Does the university offer scholarships or financial aid? If so, what are the application requirements?",
        "SWAU provides over 140 internal scholarships to undergraduate students, with 80% of undergraduates receiving scholarships. Application requirements vary by scholarship; it's recommended to contact the Student Financial Services office for specific details.",
        "https://res.cloudinary.com/djfiaa34u/video/upload/v1740097358/5_otbuxq.mp4",
    ),
    (
        6,
        "What is the application process for international students?",
        "International applicants should submit their applications by the specified deadlines and ensure they are fully admitted by the dates mentioned above. Detailed admission requirements for international students can be found in the university's academic catalog.",
        "https://res.cloudinary.com/djfiaa34u/video/upload/v1740097320/6_atgydo.mp4",
    ),
    (
        7,
        "How can parents stay informed about their child's progress and well-being at the university?",
        "Specific mechanisms for parental involvement are not outlined in the provided sources. Typically, universities offer parent portals or communication channels. For detailed information, please contact SWAU's student affairs or academic services departments.",
        "https://res.cloudinary.com/djfiaa34u/video/upload/v1740097330/7_qcmzo8.mp4",
    ),
];

impl Catalog {
    /// The university FAQ shipped with the kiosk.
    pub fn builtin() -> Self {
        let clips = BUILTIN
            .iter()
            .map(|(id, question, answer, video_url)| Clip {
                id: *id,
                question: question.to_string(),
                answer: answer.to_string(),
                video_url: video_url.to_string(),
            })
            .collect();
        Catalog { clips }
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        log::info!("Loaded {} clips from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let clips: Vec<Clip> = serde_json::from_str(content)?;
        Self::new(clips)
    }

    pub fn new(clips: Vec<Clip>) -> Result<Self, CatalogError> {
        if clips.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for clip in &clips {
            if !seen.insert(clip.id) {
                return Err(CatalogError::DuplicateId(clip.id));
            }
            url::Url::parse(&clip.video_url).map_err(|source| CatalogError::InvalidUrl {
                id: clip.id,
                url: clip.video_url.clone(),
                source,
            })?;
        }

        Ok(Catalog { clips })
    }

    pub fn get(&self, id: u32) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Clip at display position `index`.
    pub fn nth(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    pub fn position_of(&self, video_url: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.video_url == video_url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }
}

/// Blurred still for a hosted clip, shown while the clip loads.
///
/// The public id is everything after the `/v<digits>/` version segment up to
/// the first `.`. Returns `None` for URLs without a version segment.
pub fn thumbnail_url(base: &str, video_url: &str) -> Option<String> {
    let parsed = url::Url::parse(video_url).ok()?;
    let path = parsed.path();

    let mut offset = 0;
    for segment in path.split('/') {
        let start = offset;
        offset += segment.len() + 1;

        let is_version = segment.len() > 1
            && segment.starts_with('v')
            && segment[1..].bytes().all(|b| b.is_ascii_digit());
        if !is_version {
            continue;
        }

        let rest = path.get(start + segment.len() + 1..)?;
        let public_id = rest.split('.').next().unwrap_or_default();
        if public_id.is_empty() {
            return None;
        }
        return Some(format!(
            "{}/c_fill,w_640,h_853,q_auto:low,e_blur:1000/{}.jpg",
            base.trim_end_matches('/'),
            public_id
        ));
    }

    None
}
