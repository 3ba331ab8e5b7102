// Candidate ranking
//
// Decides which of two subtitle candidates better matches a target video.
// The decision cascades through ordered tie-break stages; the first stage
// that distinguishes the candidates wins. Release-type fidelity dominates
// because it reflects the source-video capture quality, which most
// affects subtitle sync; cut flags come next because a different cut
// means different scene timing; provider ranking and title distance are
// last-resort disambiguators.

use strsim::levenshtein;

use crate::guess::Information;

/// Classification of the original capture source of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    Bluray,
    Hdtv,
    Cam,
    Dvd,
    Web,
    Unknown,
}

impl ReleaseType {
    /// Classifies a free-text release string by case-insensitive exact
    /// match against the known synonym lists. Anything unmatched is
    /// `Unknown`, which participates normally in comparisons.
    pub fn classify(release: &str) -> Self {
        match release.to_lowercase().as_str() {
            "cam-rip" | "cam" | "hdcam" => Self::Cam,

            "dvdr" | "dvdrip" | "dvd-full" | "full-rip" | "iso rip" | "lossless rip"
            | "untouched rip" | "dvd-5" | "dvd-9" => Self::Dvd,

            "dsr" | "dsrip" | "satrip" | "dthrip" | "dvbrip" | "hdtv" | "pdtv" | "dtvrip"
            | "tvrip" | "hdtvrip" => Self::Hdtv,

            "webdl" | "web dl" | "web-dl" | "hdrip" | "web-dlrip" | "webrip" | "web rip"
            | "web-rip" | "web" | "web-cap" | "webcap" | "web cap" | "hc" | "hd-rip" => Self::Web,

            "blu-ray" | "bluray" | "blu ray" | "bdrip" | "brip" | "brrip" | "bdmv" | "bdr"
            | "bd25" | "bd50" | "bd5" | "bd9" => Self::Bluray,

            _ => Self::Unknown,
        }
    }
}

/// Returns whether candidate A is a better match than candidate B when
/// compared against the target.
///
/// Total and deterministic; exact ties fall through to B so that an
/// earlier-seen candidate is kept.
pub fn greater(
    target: &Information,
    service_a: &str,
    service_b: &str,
    ranking_a: f32,
    ranking_b: f32,
    a: &Information,
    b: &Information,
) -> bool {
    // Release type is the greatest factor, unless the target asks for a
    // specific cut: those targets prioritize cut-matching over raw
    // capture quality.
    if !target.extended && !target.directors_cut && !target.theatrical {
        let target_type = ReleaseType::classify(&target.release);
        let a_type = ReleaseType::classify(&a.release);
        let b_type = ReleaseType::classify(&b.release);

        if target_type == a_type && target_type != b_type {
            return true;
        }
        if target_type == b_type && target_type != a_type {
            return false;
        }
    }

    if target.extended == a.extended && target.extended != b.extended {
        return true;
    }
    if target.extended == b.extended && target.extended != a.extended {
        return false;
    }

    if target.theatrical == a.theatrical && target.theatrical != b.theatrical {
        return true;
    }
    if target.theatrical == b.theatrical && target.theatrical != a.theatrical {
        return false;
    }

    if target.directors_cut == a.directors_cut && target.directors_cut != b.directors_cut {
        return true;
    }
    if target.directors_cut == b.directors_cut && target.directors_cut != a.directors_cut {
        return false;
    }

    if target.remastered == a.remastered && target.remastered != b.remastered {
        return true;
    }
    if target.remastered == b.remastered && target.remastered != a.remastered {
        return false;
    }

    // A provider's popularity score is only comparable within that
    // provider.
    if service_a == service_b {
        if ranking_a > ranking_b {
            return true;
        }
        if ranking_a < ranking_b {
            return false;
        }
    }

    title_distance(&target.title, &a.title) < title_distance(&target.title, &b.title)
}

fn title_distance(a: &str, b: &str) -> usize {
    levenshtein(&a.to_lowercase(), &b.to_lowercase())
}
