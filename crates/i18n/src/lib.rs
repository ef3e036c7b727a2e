use std::collections::BTreeMap;

use core_types::UiLanguage;

#[derive(Debug, Clone)]
pub struct I18n {
    lang: UiLanguage,
    fr_fr: BTreeMap<&'static str, &'static str>,
    en_us: BTreeMap<&'static str, &'static str>,
}

impl I18n {
    pub fn new(lang: UiLanguage) -> Self {
        Self {
            lang,
            fr_fr: fr_fr_map(),
            en_us: en_us_map(),
        }
    }

    pub fn set_language(&mut self, lang: UiLanguage) {
        self.lang = lang;
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        let (primary, fallback) = match self.lang {
            UiLanguage::FrFr => (&self.fr_fr, &self.en_us),
            UiLanguage::EnUs => (&self.en_us, &self.fr_fr),
        };
        primary
            .get(key)
            .or_else(|| fallback.get(key))
            .copied()
            .unwrap_or(key)
    }
}

fn fr_fr_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "Notes"),
        ("login.title", "Connexion à notes"),
        ("login.username", "Nom d'utilisateur"),
        ("login.password", "Mot de passe"),
        ("login.error.title", "Erreur"),
        (
            "login.error.message",
            "Nom d'utilisateur ou mot de passe incorrect",
        ),
        ("notes.pinned", "Notes épinglées"),
        ("notes.section", "Notes"),
        ("notes.empty", "Aucune note"),
        ("notes.updated", "Mise à jour"),
        ("notes.created", "Créée le"),
        ("sort.label", "Trier par"),
        ("sort.title", "Titre"),
        ("sort.created_at", "Date de création"),
        ("sort.updated_at", "Date de mise à jour"),
        ("form.new", "Nouvelle note"),
        ("form.edit", "Modifier la note"),
        ("form.title", "Titre"),
        ("form.content", "Contenu"),
        ("form.pin", "Épingler (o/n)"),
        ("form.keep_hint", "laisser vide pour conserver"),
        ("form.error.title", "Le titre est obligatoire"),
        ("form.error.content", "Le contenu est obligatoire"),
        ("action.added", "Note ajoutée"),
        ("action.updated", "Note mise à jour"),
        ("action.deleted", "Note supprimée"),
        ("action.pinned", "Note épinglée"),
        ("action.unpinned", "Note désépinglée"),
        ("error.no_row", "Aucune note à cette position"),
        ("error.unknown_command", "Commande inconnue, tapez « help »"),
        (
            "error.save_failed",
            "Impossible d'enregistrer les notes, les modifications restent en mémoire",
        ),
        (
            "help",
            "Commandes : list, add, edit <n>, pin <n>, delete <n>, sort title|created|updated, lang fr|en, help, quit",
        ),
    ])
}

fn en_us_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "Notes"),
        ("login.title", "Sign in to notes"),
        ("login.username", "Username"),
        ("login.password", "Password"),
        ("login.error.title", "Error"),
        ("login.error.message", "Incorrect username or password"),
        ("notes.pinned", "Pinned notes"),
        ("notes.section", "Notes"),
        ("notes.empty", "No notes"),
        ("notes.updated", "Updated"),
        ("notes.created", "Created"),
        ("sort.label", "Sort by"),
        ("sort.title", "Title"),
        ("sort.created_at", "Creation date"),
        ("sort.updated_at", "Last updated"),
        ("form.new", "New note"),
        ("form.edit", "Edit note"),
        ("form.title", "Title"),
        ("form.content", "Content"),
        ("form.pin", "Pin (y/n)"),
        ("form.keep_hint", "leave empty to keep"),
        ("form.error.title", "Title is required"),
        ("form.error.content", "Content is required"),
        ("action.added", "Note added"),
        ("action.updated", "Note updated"),
        ("action.deleted", "Note deleted"),
        ("action.pinned", "Note pinned"),
        ("action.unpinned", "Note unpinned"),
        ("error.no_row", "No note at that position"),
        ("error.unknown_command", "Unknown command, type \"help\""),
        (
            "error.save_failed",
            "Could not save notes, changes are kept in memory",
        ),
        (
            "help",
            "Commands: list, add, edit <n>, pin <n>, delete <n>, sort title|created|updated, lang fr|en, help, quit",
        ),
    ])
}

#[cfg(test)]
mod tests {
    use core_types::SortOption;

    use super::*;

    #[test]
    fn returns_french_translation() {
        let i18n = I18n::new(UiLanguage::FrFr);
        assert_eq!(i18n.t("notes.pinned"), "Notes épinglées");
    }

    #[test]
    fn switches_language() {
        let mut i18n = I18n::new(UiLanguage::FrFr);
        i18n.set_language(UiLanguage::EnUs);
        assert_eq!(i18n.t("login.error.title"), "Error");
    }

    #[test]
    fn every_sort_option_has_a_label() {
        let i18n = I18n::new(UiLanguage::FrFr);
        for option in SortOption::ALL {
            assert_ne!(i18n.t(option.label_key()), option.label_key());
        }
    }

    #[test]
    fn languages_cover_the_same_keys() {
        let fr: Vec<_> = fr_fr_map().into_keys().collect();
        let en: Vec<_> = en_us_map().into_keys().collect();
        assert_eq!(fr, en);
    }

    #[test]
    fn falls_back_to_key_when_missing() {
        let i18n = I18n::new(UiLanguage::EnUs);
        assert_eq!(i18n.t("not.exists"), "not.exists");
    }
}
