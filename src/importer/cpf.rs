// ==========================================
// Sistema de Gestão Escolar - Validação de CPF
// ==========================================
// Responsabilidade: verificação estrutural do CPF (dois dígitos
// verificadores módulo 11). Utilitário independente, usado pela
// classificação de regra Cpf do validador.
// ==========================================

/// Verifica a validade estrutural de um CPF.
///
/// Normaliza para dígitos, rejeita comprimento diferente de 11 ou
/// todos os dígitos iguais, e confere os dois dígitos verificadores
/// pelo algoritmo padrão.
pub fn validate_cpf(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 {
        return false;
    }

    // Sequências repetidas (000..., 111..., etc.) passam no checksum
    // mas não são CPFs emitidos
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9], 10) == digits[9] && check_digit(&digits[..10], 11) == digits[10]
}

/// Dígito verificador módulo 11 sobre o prefixo, com peso inicial dado
fn check_digit(prefix: &[u32], initial_weight: u32) -> u32 {
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (initial_weight - i as u32))
        .sum();

    (sum * 10) % 11 % 10
}
