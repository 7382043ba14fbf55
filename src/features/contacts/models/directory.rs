/// One reachable number (or several, separated by `/`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: &'static str,
    pub number: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ContactGroup {
    pub name: &'static str,
    pub contacts: &'static [EmergencyContact],
}

#[derive(Debug, Clone, Copy)]
pub struct Credits {
    pub developed_by: &'static str,
    pub version: &'static str,
}

/// Group filter value that matches every group
pub const ALL_GROUPS: &str = "All";

pub const CREDITS: Credits = Credits {
    developed_by: "RavenLabs Development",
    version: "1.3",
};

const fn contact(name: &'static str, number: &'static str) -> EmergencyContact {
    EmergencyContact { name, number }
}

pub const DIRECTORY: &[ContactGroup] = &[
    ContactGroup {
        name: "Major Cities & National Hotlines",
        contacts: &[
            contact("National Emergency Hotline", "911"),
            contact("Cebu City Command Center", "166 / (032) 262-1424"),
            contact("Cebu City DRRMO", "0917-839-9896"),
            contact(
                "Cebu City Command Center (Cellphone)",
                "0932-537-7770 / 0917-839-9896",
            ),
            contact("Cebu City Fire Office", "(032) 256-0541 / 42 / 43"),
            contact("Mandaue City DRRMO", "(032) 420-2868"),
            contact("Mandaue City Command Center", "(032) 383-1658"),
            contact("BFP Mandaue City", "(032) 344-4747 / 344-3364"),
            contact("Lapu-Lapu City Nerve Command Center", "(032) 431-3771"),
            contact("BFP Lapu-Lapu City", "(032) 340-0252"),
            contact("Talisay City DRRMO", "(032) 491-4159"),
            contact("BFP Talisay City", "(032) 272-8277"),
            contact("Naga City DRRMO", "0916-361-4638 / 0908-415-7220"),
            contact("PNP - Naga", "(032) 272-1166 / 0998-598-6338"),
            contact("BFP - Naga", "0969-406-706"),
            contact("Philippine Coast Guard (Naga Sub-Station)", "0995-357-9982"),
            contact("Cebu Province DRRMO", "(032) 255-0046"),
        ],
    },
    ContactGroup {
        name: "Other Essential Numbers",
        contacts: &[
            contact("Visayan Electric", "0919-056-8326 / (032) 230-8326"),
            contact("Philippine Red Cross (Cebu)", "0915-583-9829 / (032) 328-9238"),
            contact("Emergency Rescue Unit Foundation (ERUF) - Metro Cebu", "161"),
            contact(
                "Bureau of Fire Protection (General)",
                "160 / (032) 233-9300 / (032) 255-7287",
            ),
            contact("BFP (Smart/TNT)", "0918-921-0000"),
        ],
    },
    ContactGroup {
        name: "Cebu Province Municipalities",
        contacts: &[
            contact("Alcantara", "0919 067 0898 / 0915 901 8000"),
            contact("Alcoy", "0962 157 3117"),
            contact("Aloguinsan", "0922 238 8140 / 0926 530 7338"),
            contact("Allegria", "(032) 476 7604 / 0928 743 1788"),
            contact("Argao", "(032) 367 7680 / 344 9871 / 0925 464 5906"),
            contact("Asturias", "0945 553 1713 / 0950 542 6502"),
            contact("Badian", "0999 986 3435 / (032) 413 0234"),
            contact("Balamban", "(032) 333 2190 / 0917 310 8010 / 0985 510 2797"),
            contact("Bantayan", "0910 622 6622 / 0915 848 6678"),
            contact("Barili", "0918 637 6365 / 0998 598 6361 (PNP)"),
            contact(
                "Bogo City",
                "(032) 342 0580 / 0945 685 2435 / 0917 920 4635 / Command Center: 0995 614 6128",
            ),
            contact("Boljoon", "(032) 482 9300 / 0961 780 1111"),
            contact("Borbon", "0999 986 6063 / 0998 598 6381 (PNP)"),
            contact("Carcar City", "0929 444 7161"),
            contact("Carmen", "(032) 429 2053 / 0934 976 5885"),
            contact(
                "Catmon",
                "0981 188 8559 / (032) 326 4223 / 0927 939 2321 (PNP)",
            ),
            contact("Compostela", "0917 812 6148"),
            contact("Consolacion", "(032) 236 2003 / 0931 214 9134"),
            contact("Cordova", "0917 149 8457 / 0917 116 9819"),
            contact("Daanbantayan", "0926 825 3800 / 0999 889 7792"),
            contact("Dalaguete", "0931 703 2223"),
            contact("Danao City", "0917 153 6955 / 0998 598 6379 (PNP)"),
            contact("Dumanjug", "0998 733 3000 / 0998 598 6358 (PNP)"),
            contact("Ginatilan", "(032) 401 4165 / 0917 845 5714"),
            contact("Liloan", "0956 271 1967 / 0923 905 9077"),
            contact(
                "Madridejos",
                "0969 316 2221 / 0950 301 9841 / 0916 647 3749",
            ),
            contact("Malabuyoc", "(032) 477 8079"),
            contact("Medellin", "(032) 266 6875 / 0932 866 7704 / 0917 623 6135"),
            contact("Minglanilla", "0943 850 9665"),
            contact("Moalboal", "0908 813 0370"),
            contact("Naga City", "0916 361 4638"),
            contact("Oslob", "0938 941 0419 / 0998 598 6348 (PNP)"),
            contact("Pinamungajan", "(032) 468 9686 / 0949 802 4194"),
            contact("Pilar", "0962 378 3605"),
            contact("Poro", "0995 156 8504"),
            contact("Ronda", "0970 778 7177"),
            contact("Samboan", "0996 789 9798 / 0998 598 6350 (PNP)"),
            contact(
                "San Fernando",
                "(032) 260 2083 / 0942 638 3201 / 0962 041 7896 (BFP)",
            ),
            contact("San Francisco", "0929 541 2144"),
            contact("Santa Fe", "0981 446 7661 / 0927 447 5176"),
            contact("Santander", "0961 696 8000"),
            contact("Sibonga", "(032) 234 6603 / 0995 468 5927 / 0961 850 4538"),
            contact("Sogod", "0906 537 0939 / 0995 873 6046"),
            contact("Tabogon", "0917 114 0556"),
            contact("Tabuelan", "0960 828 4513"),
            contact(
                "Talisay City",
                "(032) 407 5928 / 0917 811 4078 / 0969 453 6321",
            ),
            contact("Toledo City", "0956 817 4215 / 0915 642 6842 (PNP)"),
            contact(
                "Tuburan",
                "0933 214 1382 / 0917 116 1363 / 0951 558 4283",
            ),
            contact("Tudela", "0977 764 1563 / 0922 692 4506"),
        ],
    },
];

impl EmergencyContact {
    /// First listed number reduced to digits and `+`, for `tel:` links
    pub fn dial(&self) -> String {
        self.number
            .split('/')
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dial_uses_first_number() {
        assert_eq!(contact("x", "166 / (032) 262-1424").dial(), "166");
        assert_eq!(contact("x", "(032) 420-2868").dial(), "0324202868");
        assert_eq!(contact("x", "0918 637 6365 / 0998").dial(), "09186376365");
    }

    #[test]
    fn test_group_names_are_unique() {
        let mut names: Vec<_> = DIRECTORY.iter().map(|g| g.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DIRECTORY.len());
        assert!(!names.contains(&ALL_GROUPS));
    }
}
