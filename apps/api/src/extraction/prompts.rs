// Engine prompt constants for the Extraction module.

/// CV parsing instruction. Polish on purpose: the product's recruiters work
/// with Polish-language CVs and the engine follows the instruction language.
/// Requests DD/MM/YYYY for the birth date and YYYY-MM for entry dates, and
/// asks the engine to leave missing information empty rather than invent it.
pub const EXTRACTION_PROMPT: &str = "Przeanalizuj poniższe CV i wyodrębnij następujące informacje \
    w formacie JSON: imię i nazwisko (fullName), data urodzenia (birthDate w formacie DD/MM/YYYY), \
    oraz historia zatrudnienia (experience) jako tablica obiektów, gdzie każdy obiekt zawiera \
    stanowisko (position), firmę (company), datę rozpoczęcia (startDate w formacie YYYY-MM), \
    datę zakończenia (endDate w formacie YYYY-MM) i krótki opis (description). \
    Jeśli brakuje jakiejś informacji, zostaw puste pole.";
