//! Standard detector table
//!
//! Ordered so that every detector's `requires` facts are produced earlier:
//! actors first, then the themes in schema order.

use super::{Detector, Signal};
use crate::error::Result;

const ADMISSION_DENIAL_PHRASES: &[&str] = &[
    "denied admission",
    "denied to admit",
    "refused admission",
    "refused to admit",
    "not admitted",
    "not allowed to admit",
    "did not admit",
    "didn't admit",
    "would not admit",
    "wouldn't admit",
];

const CONSENT_PHRASES: &[&str] = &[
    "without consent",
    "without my consent",
    "without our consent",
    "without his consent",
    "without her consent",
    "without their consent",
    "no consent",
    "did not explain",
    "didn't explain",
    "never explained",
    "without asking",
];

const RECORD_DENIAL_PHRASES: &[&str] = &[
    "did not give",
    "didn't give",
    "not given",
    "never gave",
    "not provided",
    "still waiting",
    "even after asking",
    "would not give",
    "wouldn't give",
    "won't give",
];

fn pattern(p: &str) -> Result<Signal> {
    Signal::pattern(p)
}

/// Build the standard detector table
pub fn standard_detectors() -> Result<Vec<Detector>> {
    let detectors = vec![
        // Actors
        Detector::flag(
            "doctor_involved",
            pattern(
                r"\b(doctors?|physicians?|surgeons?|dr|gyn(a)?ecologists?|p(a)?ediatricians?|cardiologists?|an(a)?esthetists?|orthop(a)?edics?)\b",
            )?,
        ),
        Detector::flag(
            "hospital_involved",
            Signal::phrases(&[
                "hospital",
                "clinic",
                "nursing home",
                "medical college",
                "health centre",
                "health center",
                "casualty",
            ]),
        ),
        Detector::flag(
            "staff_involved",
            pattern(
                r"\b(nurses?|staff|receptionists?|ward ?boys?|attendants?|security guards?|compounders?|billing (counter|desk|department))\b",
            )?,
        ),
        // Emergency
        Detector::flag(
            "emergency_claimed",
            pattern(r"\b(emergency|urgent|urgently|critical|life[- ]threatening|serious condition|dying)\b")?,
        ),
        Detector::flag(
            "emergency_case",
            pattern(
                r"\b(accident|bleeding|unconscious|injured|injury|heart attack|stroke|seizures?|fits|labou?r pains?|snake ?bite|poisoning|burns|fracture|collapsed|not breathing)\b",
            )?,
        ),
        Detector::flag(
            "treatment_refused",
            pattern(
                r"\b(refused|refuse|refusing|deny|denied|ignored)\b|did not treat|didn't treat|no treatment|not treated|(turned|sent) (us|me|him|her|them) away",
            )?,
        ),
        Detector::flag("admission_denied", Signal::phrases(ADMISSION_DENIAL_PHRASES)),
        Detector::flag(
            "payment_demanded",
            pattern(
                r"\b(ask|asked|asking|demand|demanded|demanding|insisted)\b.{0,60}\b(payment|money|fees|deposit|advance)\b|full payment|payment first|pay first|fees first|advance payment|deposit first|cash first",
            )?,
        ),
        Detector::flag(
            "treatment_delayed",
            pattern(
                r"kept (us|me|him|her|them) waiting|waited (for )?(hours|\d+ hours)|(delayed|delay in) (the )?(treatment|surgery|operation|admission)|treatment was delayed|(no one|nobody) attended",
            )?,
        ),
        Detector::flag(
            "ambulance_refused",
            pattern(
                r"ambulance.{0,40}\b(refused|denied|not (provided|sent|available)|never (came|arrived))|\b(refused|denied)\b.{0,40}ambulance",
            )?,
        ),
        // Consent
        Detector::flag(
            "consent_issue",
            Signal::Any(vec![
                Signal::phrases(CONSENT_PHRASES),
                Signal::All(vec![
                    pattern(r"\b(surgery|procedure|operation)\b")?,
                    pattern(r"\b(without|not explained|did not|didn't|not told|never told)\b")?,
                ]),
            ]),
        ),
        Detector::flag(
            "procedure_performed",
            pattern(
                r"\b(surgery|surgeries|procedure|operation|operated|injection|biopsy|an(a)?esthesia|c-section|ca?esarean|hysterectomy|transfusion)\b",
            )?,
        ),
        Detector::flag(
            "risks_not_explained",
            pattern(
                r"\b(risks?|side[- ]effects?|complications?)\b.{0,40}\b(not explained|never explained|not told|never told|not informed)\b|\b(did not|didn't|never|not|no one|nobody)\s(explain|tell|told|inform|mention)\w*\b.{0,40}\b(risks?|side[- ]effects?|complications?)\b",
            )?,
        ),
        Detector::flag(
            "consent_form_forced",
            pattern(
                r"forced (me |us |him |her |them )?to sign|made (me|us|him|her|them) sign|sign\w* (on )?(a )?blank (form|paper)|forged (my |our )?signature|signature (was )?forged",
            )?,
        ),
        // Records
        Detector::flag(
            "records_issue.requested",
            pattern(
                r"\b(reports?|records?|test results?|file|medical papers|discharge summary|case sheet|case papers|x-ray films?)\b",
            )?,
        ),
        Detector::flag(
            "records_issue.denied",
            Signal::Any(vec![
                pattern(r"\b(refused|denied|withheld|withholding)\b|not sharing")?,
                Signal::phrases(RECORD_DENIAL_PHRASES),
            ]),
        )
        .requires(&["records_issue.requested"]),
        Detector::flag("records_issue.by_doctor", Signal::Always)
            .requires(&["records_issue.requested", "doctor_involved"]),
        Detector::flag("records_issue.by_hospital", Signal::Always)
            .requires(&["records_issue.requested", "hospital_involved"]),
        // Information
        Detector::flag(
            "diagnosis_not_explained",
            pattern(
                r"\b(diagnosis|condition|illness|disease)\b.{0,40}\b(not explained|never explained|not told|never told|kept (us |me )?in the dark)\b|\b(did not|didn't|never|not|no one|nobody)\s(explain|tell|told|inform)\w*\b.{0,30}\b(diagnosis|condition|illness|disease|what (was|is) wrong)\b",
            )?,
        ),
        Detector::flag(
            "cost_estimate_withheld",
            pattern(
                r"\b(no|without|never gave|did not give|didn't give|refused to give|not given)\b.{0,20}\b(cost |expense |price )?estimates?\b|\b(costs?|expenses?|charges)\b.{0,30}\bnot (told|explained|disclosed|informed)",
            )?,
        ),
        // Privacy and dignity
        Detector::flag(
            "privacy_breached",
            pattern(
                r"\b(shared|discussed|disclosed|revealed|leaked|announced)\b.{0,60}\b(medical|condition|information|diagnosis|reports?|status)\b|without my permission|in front of (others|everyone|other patients|strangers)|\bloudly\b",
            )?,
        ),
        Detector::flag(
            "dignity_violated",
            pattern(
                r"without (a |any )?(female |lady )?(chaperone|attendant)|no (female |lady )?(chaperone|attendant)|\b(stripped|undressed|exposed)\b.{0,40}\b(front of|public|corridor|others)\b|tied to the bed|humiliat\w*",
            )?,
        ),
        Detector::flag(
            "second_opinion_denied",
            Signal::All(vec![
                pattern(r"second opinion|another doctor|consult another|other hospital")?,
                pattern(r"\b(refused|not allowed|stopped|denied|would not let|wouldn't let)\b")?,
            ]),
        ),
        // Billing
        Detector::flag(
            "billing_issue",
            Signal::All(vec![
                pattern(r"\b(charges|bill|billing|fees)\b")?,
                pattern(r"\b(hidden|sudden|suddenly|changed|not informed|increased|extra)\b")?,
            ]),
        ),
        Detector::flag(
            "overcharged",
            pattern(
                r"overcharg\w*|charged (us |me )?(more|extra|double|twice)|inflated bills?|excess(ive)? (charges|billing|bill)|more than the (printed |displayed |fixed )?(mrp|rate|price)",
            )?,
        ),
        Detector::flag(
            "rates_not_displayed",
            pattern(
                r"\b(rates?|prices?|charges|tariffs?)\b.{0,40}\bnot (displayed|shown|written|put up)\b|\bno (rate|price) (list|chart|board)\b",
            )?,
        ),
        // Discrimination
        Detector::flag(
            "discrimination_claimed",
            pattern(
                r"discriminat\w*|treated (me |us |him |her |them )?differently|because (of )?(my|our|his|her|their) (caste|religion|gender|age|poverty|illness|disease|disability)\b|because of (caste|religion|gender)\b|because (i|we|he|she|they) (am|are|is|was|were) (poor|old|disabled|a woman|muslim|hindu|christian|sikh|dalit)",
            )?,
        ),
        Detector::first_match(
            "discrimination_basis",
            vec![
                (
                    "religion",
                    pattern(r"\b(religion|religious|muslim|hindu|christian|sikh|jain|parsi|faith)\b")?,
                ),
                (
                    "caste",
                    pattern(r"\b(caste|dalit|scheduled tribe|tribal|untouchab\w*)\b")?,
                ),
                (
                    "gender",
                    pattern(r"\b(gender|woman|women|female|transgender|girl)\b")?,
                ),
                (
                    "age",
                    pattern(r"\b(age|old|elderly|aged|senior citizen|too young)\b")?,
                ),
                (
                    "economic_status",
                    pattern(r"\b(poor|poverty|money|afford|economic\w*|bpl|ration card|slum)\b")?,
                ),
                (
                    "illness",
                    pattern(r"\b(hiv|aids|tuberculosis|tb|covid|leprosy|illness|disease|infection)\b")?,
                ),
                (
                    "disability",
                    pattern(r"\b(disab\w*|handicap\w*|wheelchair|blind|deaf|mute)\b")?,
                ),
            ],
        )
        .requires(&["discrimination_claimed"]),
        // Choice of pharmacy and diagnostics
        Detector::flag(
            "pharmacy_forced",
            pattern(
                r"\b(forced|made|told|insisted|compelled)\b.{0,40}\b(buy|purchase)\w*\b.{0,40}\b(pharmacy|medical store|chemist|their store|hospital store)\b|\bonly from (the |their |hospital('s)? )?(pharmacy|medical store|chemist)\b",
            )?,
        ),
        Detector::flag(
            "lab_forced",
            pattern(
                r"\b(forced|made|insisted|compelled)\b.{0,60}\b(tests?|scans?|x-rays?)\b.{0,40}\b(their|same|hospital('s)?|particular|specific) (lab|laboratory|diagnostic|cent(er|re))|\bonly from (their|the hospital('s)?) (lab|laboratory|diagnostic)",
            )?,
        ),
        // Referral and transfer
        Detector::flag(
            "transfer_refused",
            pattern(
                r"\b(refused|denied|not allowed|would not let|wouldn't let|did not let|didn't let)\b.{0,40}\b(transfer|shift|shifting|move|referral|refer|another hospital)\b|\b(transfer|referral)\b.{0,40}\b(refused|denied|not allowed)\b",
            )?,
        ),
        Detector::flag(
            "referral_commission",
            pattern(r"\b(commission|kickbacks?|cut practice|referral fees?)\b")?,
        ),
        // Discharge
        Detector::flag(
            "discharge_refused",
            pattern(
                r"\b(not|refused to|won't|wouldn't|would not|did not|didn't)\b (let (us|me|him|her|them) )?(leave|discharge|go home)\b|\b(detained|held back|not discharged)\b.{0,40}\b(bill|payment|dues)\b|discharge.{0,30}\b(refused|denied|until (we|i) (pay|paid|clear))",
            )?,
        ),
        Detector::flag(
            "body_withheld",
            pattern(
                r"\b(body|dead body|deceased|corpse|remains)\b.{0,60}\b(not (released|handed|given)|withheld|refused|held back|until (we|i) (pay|paid|clear))|\b(refused|denied)\b.{0,30}\b(release|hand over|give)\b.{0,20}\bbody\b",
            )?,
        ),
        // Research
        Detector::flag(
            "trial_without_consent",
            Signal::All(vec![
                pattern(r"\b(clinical trials?|trials?|experiment\w*|research|study)\b")?,
                pattern(
                    r"without (my |our |his |her |their )?(consent|knowledge|permission)|not told|never told|didn't know|did not know|no consent",
                )?,
            ]),
        ),
        // Grievance
        Detector::flag(
            "grievance_ignored",
            pattern(
                r"\b(complaints?|grievances?)\b.{0,60}\b(ignored|no (response|reply|action)|not (heard|addressed|registered|accepted|taken)|refused|rejected)\b|\b(no|without (a |any )?)grievance (cell|officer|mechanism|desk|redressal)|\b(refused|denied) to (take|accept|register) (my |our )?complaint",
            )?,
        ),
        // Quality and safety
        Detector::flag(
            "negligence_claimed",
            pattern(
                r"negligen\w*|wrong (medicine|medication|drug|injection|dose|blood|limb|leg|arm|side|surgery|operation|diagnosis|treatment)|left (a |an )?(swab|sponge|instrument|gauze|needle)|careless\w*|botched",
            )?,
        ),
        Detector::flag(
            "unhygienic_conditions",
            pattern(r"unhygienic|dirty|filthy|unsterile|not sterili[sz]ed|re-?used (needles?|syringes?)|cockroach\w*")?,
        ),
        Detector::flag(
            "patient_abandoned",
            pattern(
                r"abandon\w*|left (me|us|him|her|them|the patient) (alone|unattended)|walked (out|away) (in the middle|midway)|(no one|nobody) came|(left|stopped) (the )?treatment (midway|halfway|in between|in the middle)",
            )?,
        ),
        // Doctor conduct
        Detector::flag(
            "doctor_under_influence",
            pattern(
                r"\b(drunk|intoxicated|alcohol|under the influence|(smelled|smelt) of (liquor|alcohol)|on drugs)\b",
            )?,
        )
        .requires(&["doctor_involved"]),
        Detector::flag(
            "prescription_illegible",
            pattern(
                r"illegible|(could not|couldn't|unable to|nobody could|no one could) read (the |his |her )?(prescription|handwriting)|prescription.{0,30}(unreadable|not readable)",
            )?,
        ),
        Detector::flag(
            "brand_name_forced",
            pattern(
                r"\bbrand(ed)? (name )?(medicines?|drugs?)\b|\b(refused|did not|didn't|would not|wouldn't)\b.{0,20}\bgeneric\b|\bno generic\b",
            )?,
        ),
        Detector::flag(
            "registration_not_displayed",
            pattern(
                r"registration (number|certificate|no)\b.{0,40}\b(not (displayed|shown|mentioned|given)|missing|absent)|\bnot (a )?registered (doctor|practitioner|medical practitioner)|\bfake doctor|\bquack\b",
            )?,
        ),
        Detector::flag(
            "false_certificate",
            pattern(
                r"\b(fake|false|forged|wrong)\b (medical |death |fitness |disability )?certificates?|\b(fake|false|forged) (reports?|documents?)",
            )?,
        ),
        // Procedural remedy claims
        Detector::flag(
            "mistreatment_claimed",
            pattern(r"\b(mistreated|mistreatment|treated badly|bad behaviou?r|rude|rudely|misbehav\w*)\b")?,
        ),
        Detector::flag(
            "abuse_claimed",
            pattern(
                r"\b(abuse|abused|abusing|abusive|shout|shouted|shouting|insult|insulted|insulting|threaten|threatened|threatening|slapped|beat)\b",
            )?,
        ),
        Detector::flag(
            "unethical_behavior_claimed",
            pattern(r"\b(unethical|irresponsible|wrong conduct|unprofessional)\b")?,
        ),
    ];

    Ok(detectors)
}
