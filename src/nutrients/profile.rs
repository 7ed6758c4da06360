use serde::{Deserialize, Serialize};

/// Accessor pair for one optional nutrient field.
pub(crate) struct Field<T: 'static> {
    pub name: &'static str,
    pub get: fn(&NutrientProfile) -> Option<T>,
    pub set: fn(&mut NutrientProfile, Option<T>),
}

macro_rules! nutrient_profile {
    (
        floats { $($float:ident),* $(,)? }
        ints { $($int:ident),* $(,)? }
    ) => {
        /// Sparse nutrient record. Values are per 100 g of food unless the
        /// profile was already scaled to a consumed amount.
        ///
        /// `None` means "not provided" and is never the same as zero.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct NutrientProfile {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $float: Option<f64>,
            )*
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $int: Option<i64>,
            )*
        }

        pub(crate) const FLOAT_FIELDS: &[Field<f64>] = &[
            $(
                Field {
                    name: stringify!($float),
                    get: |p| p.$float,
                    set: |p, v| p.$float = v,
                },
            )*
        ];

        pub(crate) const INT_FIELDS: &[Field<i64>] = &[
            $(
                Field {
                    name: stringify!($int),
                    get: |p| p.$int,
                    set: |p, v| p.$int = v,
                },
            )*
        ];
    };
}

nutrient_profile! {
    floats {
        // macronutrients
        calories,
        protein_g,
        total_fat_g,
        carbohydrates_g,
        dietary_fiber_g,
        total_sugars_g,
        added_sugars_g,
        water_g,
        // fats, g
        saturated_fats_g,
        monounsaturated_fats_g,
        polyunsaturated_fats_g,
        trans_fats_g,
        // fatty acids, mg
        omega_3_mg,
        omega_6_mg,
        omega_9_mg,
        alpha_linolenic_acid_mg,
        linoleic_acid_mg,
        eicosapentaenoic_acid_mg,
        docosahexaenoic_acid_mg,
        cholesterol_mg,
        // vitamins
        vitamin_a_mcg,
        vitamin_c_mg,
        vitamin_d_mcg,
        vitamin_e_mg,
        vitamin_k_mcg,
        vitamin_b1_mg,
        vitamin_b2_mg,
        vitamin_b3_mg,
        vitamin_b5_mg,
        vitamin_b6_mg,
        vitamin_b7_mcg,
        vitamin_b9_mcg,
        vitamin_b12_mcg,
        folate_dfe_mcg,
        choline_mg,
        // minerals
        calcium_mg,
        iron_mg,
        magnesium_mg,
        phosphorus_mg,
        potassium_mg,
        sodium_mg,
        zinc_mg,
        copper_mg,
        manganese_mg,
        selenium_mcg,
        iodine_mcg,
        // amino acids, mg
        lysine_mg,
        methionine_mg,
        cysteine_mg,
        phenylalanine_mg,
        tyrosine_mg,
        threonine_mg,
        tryptophan_mg,
        valine_mg,
        histidine_mg,
        leucine_mg,
        isoleucine_mg,
        // special substances
        caffeine_mg,
        ethyl_alcohol_g,
        glycemic_load,
    }
    ints {
        glycemic_index,
    }
}

impl NutrientProfile {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        FLOAT_FIELDS.iter().all(|f| (f.get)(self).is_none())
            && INT_FIELDS.iter().all(|f| (f.get)(self).is_none())
    }

    /// Names of the fields that carry a value, in table order.
    pub fn present_fields(&self) -> Vec<&'static str> {
        FLOAT_FIELDS
            .iter()
            .filter(|f| (f.get)(self).is_some())
            .map(|f| f.name)
            .chain(
                INT_FIELDS
                    .iter()
                    .filter(|f| (f.get)(self).is_some())
                    .map(|f| f.name),
            )
            .collect()
    }
}
