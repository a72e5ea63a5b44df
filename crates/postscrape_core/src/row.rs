/// Column labels of the output file, in emission order.
pub const OUTPUT_HEADER: [&str; 12] = [
    "Author name",
    "Job Title",
    "Location",
    "Job type",
    "Remote/Onsite",
    "Job Description",
    "Post Date/Time",
    "Required Qualification",
    "Required Skills",
    "Post Link",
    "Contact Details",
    "Salary Package",
];

/// Collapse runs of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkplaceMode {
    Remote,
    Hybrid,
    OnSite,
    #[default]
    Unknown,
}

impl WorkplaceMode {
    /// Output label; `Unknown` renders empty.
    pub fn label(self) -> &'static str {
        match self {
            WorkplaceMode::Remote => "Remote",
            WorkplaceMode::Hybrid => "Hybrid",
            WorkplaceMode::OnSite => "On-site",
            WorkplaceMode::Unknown => "",
        }
    }
}

/// One extracted post. Every field is whitespace-normalized; a missing
/// value is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultRow {
    pub author: String,
    pub job_title: String,
    pub location: String,
    pub employment_type: String,
    pub workplace: String,
    pub description: String,
    pub posted_at: String,
    pub qualifications: String,
    pub skills: String,
    pub post_url: String,
    pub contact: String,
    pub salary: String,
}

impl ResultRow {
    /// A row with no author, description and link carries no signal.
    pub fn has_signal(&self) -> bool {
        !(self.author.is_empty() && self.description.is_empty() && self.post_url.is_empty())
    }

    /// A copy with every field passed through [`normalize_whitespace`].
    pub fn normalized(&self) -> ResultRow {
        ResultRow {
            author: normalize_whitespace(&self.author),
            job_title: normalize_whitespace(&self.job_title),
            location: normalize_whitespace(&self.location),
            employment_type: normalize_whitespace(&self.employment_type),
            workplace: normalize_whitespace(&self.workplace),
            description: normalize_whitespace(&self.description),
            posted_at: normalize_whitespace(&self.posted_at),
            qualifications: normalize_whitespace(&self.qualifications),
            skills: normalize_whitespace(&self.skills),
            post_url: normalize_whitespace(&self.post_url),
            contact: normalize_whitespace(&self.contact),
            salary: normalize_whitespace(&self.salary),
        }
    }

    /// Field values in [`OUTPUT_HEADER`] order, normalized.
    pub fn to_record(&self) -> [String; 12] {
        [
            &self.author,
            &self.job_title,
            &self.location,
            &self.employment_type,
            &self.workplace,
            &self.description,
            &self.posted_at,
            &self.qualifications,
            &self.skills,
            &self.post_url,
            &self.contact,
            &self.salary,
        ]
        .map(|value| normalize_whitespace(value))
    }
}
